use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a shader is in its usage protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Deactivated,
    Activated,
    ViewReceived,
    GeometryBufferReceived,
    MaterialReceived,
    VolumeReceived,
    ShadowMapReceived,
    ProjectiveReceived,
    InstanceReceived,
    Validated,
}

impl State {
    pub const ALL: [State; 10] = [
        State::Deactivated,
        State::Activated,
        State::ViewReceived,
        State::GeometryBufferReceived,
        State::MaterialReceived,
        State::VolumeReceived,
        State::ShadowMapReceived,
        State::ProjectiveReceived,
        State::InstanceReceived,
        State::Validated,
    ];
}

/// A call a back end makes on a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    Activate,
    ReceiveViewValues,
    ReceiveMaterialValues,
    ReceiveInstanceValues,
    ReceiveGeometryBuffer,
    ReceiveVolumeTransform,
    ReceiveProjectiveValues,
    ReceiveShadowMap,
    Validate,
    Deactivate,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Activate => "activate",
            Step::ReceiveViewValues => "receive_view_values",
            Step::ReceiveMaterialValues => "receive_material_values",
            Step::ReceiveInstanceValues => "receive_instance_values",
            Step::ReceiveGeometryBuffer => "receive_geometry_buffer",
            Step::ReceiveVolumeTransform => "receive_volume_transform",
            Step::ReceiveProjectiveValues => "receive_projective_values",
            Step::ReceiveShadowMap => "receive_shadow_map",
            Step::Validate => "validate",
            Step::Deactivate => "deactivate",
        };
        f.write_str(name)
    }
}

/// One row of a transition table.
///
/// `to == None` makes the step a pure check: it must be taken from one of
/// the `from` states and leaves the state where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub step: Step,
    pub from: &'static [State],
    pub to: Option<State>,
}

impl Rule {
    const fn new(step: Step, from: &'static [State], to: Option<State>) -> Self {
        Self { step, from, to }
    }

    /// The state after taking this rule from `current`.
    pub fn target(&self, current: State) -> State {
        self.to.unwrap_or(current)
    }
}

use State::{
    Activated as A, Deactivated as D, GeometryBufferReceived as G, InstanceReceived as I,
    MaterialReceived as M, ProjectiveReceived as P, ShadowMapReceived as Sh, Validated as Done,
    ViewReceived as V, VolumeReceived as Vol,
};

const DEACTIVATE: Rule = Rule::new(Step::Deactivate, &State::ALL, Some(D));
const ACTIVATE: Rule = Rule::new(Step::Activate, &[D], Some(A));
// Once per activation for every kind; a material switch does not reopen it.
const VIEW: Rule = Rule::new(Step::ReceiveViewValues, &[A], Some(V));
const GBUFFER: Rule = Rule::new(Step::ReceiveGeometryBuffer, &[A], Some(G));
const LIGHT_MATERIAL: Rule = Rule::new(Step::ReceiveMaterialValues, &[G], Some(M));

const INSTANCE_SINGLE: &[Rule] = &[
    ACTIVATE,
    VIEW,
    Rule::new(Step::ReceiveMaterialValues, &[V, Done], Some(M)),
    Rule::new(Step::ReceiveInstanceValues, &[M, Done], Some(I)),
    Rule::new(Step::Validate, &[I], Some(Done)),
];

const INSTANCE_BATCHED: &[Rule] = &[
    ACTIVATE,
    VIEW,
    Rule::new(Step::ReceiveMaterialValues, &[V, M, Done], Some(M)),
    Rule::new(Step::Validate, &[M], Some(Done)),
];

const DEPTH_SINGLE: &[Rule] = &[
    ACTIVATE,
    VIEW,
    Rule::new(Step::ReceiveMaterialValues, &[V, M, I], Some(M)),
    Rule::new(Step::ReceiveInstanceValues, &[M, I], Some(I)),
    Rule::new(Step::Validate, &[I], None),
];

const DEPTH_BATCHED: &[Rule] = &[
    ACTIVATE,
    VIEW,
    Rule::new(Step::ReceiveMaterialValues, &[V, M], Some(M)),
    Rule::new(Step::Validate, &[M], None),
];

const FILTER: &[Rule] = &[
    ACTIVATE,
    Rule::new(Step::ReceiveMaterialValues, &[A, M], Some(M)),
    Rule::new(Step::Validate, &[M], None),
];

const LIGHT_SCREEN_SINGLE: &[Rule] = &[
    ACTIVATE,
    GBUFFER,
    LIGHT_MATERIAL,
    Rule::new(Step::Validate, &[M], None),
];

const LIGHT_VOLUME_SINGLE: &[Rule] = &[
    ACTIVATE,
    GBUFFER,
    LIGHT_MATERIAL,
    Rule::new(Step::ReceiveVolumeTransform, &[M], Some(Vol)),
    Rule::new(Step::Validate, &[Vol], Some(Done)),
];

const LIGHT_PROJECTIVE: &[Rule] = &[
    ACTIVATE,
    GBUFFER,
    LIGHT_MATERIAL,
    Rule::new(Step::ReceiveVolumeTransform, &[M], Some(Vol)),
    Rule::new(Step::ReceiveProjectiveValues, &[Vol], Some(P)),
    Rule::new(Step::Validate, &[P], Some(Done)),
];

const LIGHT_SHADOWED: &[Rule] = &[
    ACTIVATE,
    GBUFFER,
    LIGHT_MATERIAL,
    Rule::new(Step::ReceiveShadowMap, &[M], Some(Sh)),
    Rule::new(Step::ReceiveInstanceValues, &[Sh], Some(I)),
    Rule::new(Step::Validate, &[I], None),
];

const LIGHT_SHADOWED_PROJECTIVE: &[Rule] = &[
    ACTIVATE,
    GBUFFER,
    LIGHT_MATERIAL,
    Rule::new(Step::ReceiveShadowMap, &[M], Some(Sh)),
    Rule::new(Step::ReceiveProjectiveValues, &[Sh], Some(P)),
    Rule::new(Step::ReceiveInstanceValues, &[P], Some(I)),
    Rule::new(Step::Validate, &[I], None),
];

/// What kind of pass a shader belongs to, which fixes the steps it takes
/// and the order it takes them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderKind {
    InstanceSingle,
    InstanceBatched,
    InstanceBillboarded,
    DepthSingle,
    DepthBatched,
    Filter,
    LightScreenSingle,
    LightVolumeSingle,
    LightProjective,
    LightShadowed { projective: bool },
}

impl ShaderKind {
    /// The transition table, excluding `Deactivate`, which every kind accepts
    /// from any state.
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            ShaderKind::InstanceSingle => INSTANCE_SINGLE,
            ShaderKind::InstanceBatched | ShaderKind::InstanceBillboarded => INSTANCE_BATCHED,
            ShaderKind::DepthSingle => DEPTH_SINGLE,
            ShaderKind::DepthBatched => DEPTH_BATCHED,
            ShaderKind::Filter => FILTER,
            ShaderKind::LightScreenSingle => LIGHT_SCREEN_SINGLE,
            ShaderKind::LightVolumeSingle => LIGHT_VOLUME_SINGLE,
            ShaderKind::LightProjective => LIGHT_PROJECTIVE,
            ShaderKind::LightShadowed { projective: false } => LIGHT_SHADOWED,
            ShaderKind::LightShadowed { projective: true } => LIGHT_SHADOWED_PROJECTIVE,
        }
    }

    /// The rule for `step`, or `None` if this kind never takes it.
    pub fn rule(&self, step: Step) -> Option<&'static Rule> {
        if step == Step::Deactivate {
            return Some(&DEACTIVATE);
        }
        self.rules().iter().find(|r| r.step == step)
    }

    /// Whether this kind takes `step` at all.
    pub fn accepts(&self, step: Step) -> bool {
        self.rule(step).is_some()
    }
}
