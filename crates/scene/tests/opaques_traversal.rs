use std::sync::Arc;

use glam::Mat4;
use lumen_common::{
    BatchedInstance, Billboard, BillboardedInstance, Group, IdPool, InstanceId, Material,
    MaterialId, MeshHandle, ShaderId, SingleInstance,
};
use lumen_scene::{SceneError, SceneOpaques};
use lumen_test_utils::{ConsumerEvent, RecordingConsumer, RecordingShader, TestMaterial, init_tracing};

fn shader(id: u64) -> Arc<RecordingShader> {
    Arc::new(RecordingShader::new(ShaderId(id)))
}

fn material(id: u64, shader: &Arc<RecordingShader>) -> Arc<TestMaterial> {
    Arc::new(Material::new(MaterialId(id), Arc::clone(shader), [1.0; 4]))
}

fn single(id: u64, mesh: u64) -> Arc<SingleInstance> {
    Arc::new(SingleInstance::new(
        InstanceId(id),
        MeshHandle(mesh),
        Mat4::IDENTITY,
    ))
}

fn record(scene: &SceneOpaques<TestMaterial>) -> RecordingConsumer {
    let mut consumer = RecordingConsumer::new();
    scene.execute(&mut consumer);
    consumer
}

#[test]
fn mesh_segmentation_flushes_each_mesh_together() {
    init_tracing();
    let s = shader(0);
    let m = material(0, &s);
    let mut scene = SceneOpaques::new();
    for (id, mesh) in [(0, 1), (3, 2), (1, 1), (4, 2), (2, 1), (5, 2)] {
        scene.add_single(single(id, mesh), Arc::clone(&m)).unwrap();
    }

    let consumer = record(&scene);
    let body: Vec<ConsumerEvent> = consumer
        .events()
        .iter()
        .filter(|e| {
            matches!(
                e,
                ConsumerEvent::SingleArrayStart { .. } | ConsumerEvent::Single { .. }
            )
        })
        .cloned()
        .collect();

    let draw = |i| ConsumerEvent::Single {
        material: MaterialId(0),
        instance: InstanceId(i),
    };
    assert_eq!(
        body,
        vec![
            ConsumerEvent::SingleArrayStart {
                mesh: MeshHandle(1),
                instance: InstanceId(0)
            },
            draw(0),
            draw(1),
            draw(2),
            ConsumerEvent::SingleArrayStart {
                mesh: MeshHandle(2),
                instance: InstanceId(3)
            },
            draw(3),
            draw(4),
            draw(5),
        ]
    );
}

#[test]
fn groups_run_lowest_first_regardless_of_insertion() {
    init_tracing();
    let s = shader(0);
    let m = material(0, &s);
    let mut scene = SceneOpaques::new();
    let g3 = Group::new(3).unwrap();
    let g1 = Group::new(1).unwrap();
    scene.add_single_in_group(single(0, 0), Arc::clone(&m), g3).unwrap();
    scene.add_single_in_group(single(1, 0), m, g1).unwrap();

    let consumer = record(&scene);
    assert_eq!(consumer.groups(), vec![g1, g3]);
    assert_eq!(consumer.singles(), vec![InstanceId(1), InstanceId(0)]);
}

#[test]
fn full_callback_shape_for_one_group() {
    let s0 = shader(10);
    let s1 = shader(11);
    let m0 = material(100, &s0);
    let m1 = material(101, &s1);
    let mut scene = SceneOpaques::new();

    let batch = Arc::new(BatchedInstance::new(InstanceId(1), MeshHandle(7), 4));
    scene.add_batched(Arc::clone(&batch), Arc::clone(&m1)).unwrap();
    scene.add_single(single(2, 7), Arc::clone(&m0)).unwrap();

    let consumer = record(&scene);
    let g = Group::DEFAULT;
    assert_eq!(
        consumer.events(),
        &[
            ConsumerEvent::Start,
            ConsumerEvent::BatchedUpdate {
                instance: InstanceId(1)
            },
            ConsumerEvent::StartGroup { group: g },
            ConsumerEvent::BatchedShaderStart {
                shader: ShaderId(11)
            },
            ConsumerEvent::BatchedMaterialStart {
                material: MaterialId(101)
            },
            ConsumerEvent::Batched {
                material: MaterialId(101),
                instance: InstanceId(1)
            },
            ConsumerEvent::BatchedMaterialFinish {
                material: MaterialId(101)
            },
            ConsumerEvent::BatchedShaderFinish {
                shader: ShaderId(11)
            },
            ConsumerEvent::SingleShaderStart {
                shader: ShaderId(10)
            },
            ConsumerEvent::SingleMaterialStart {
                material: MaterialId(100)
            },
            ConsumerEvent::SingleArrayStart {
                mesh: MeshHandle(7),
                instance: InstanceId(2)
            },
            ConsumerEvent::Single {
                material: MaterialId(100),
                instance: InstanceId(2)
            },
            ConsumerEvent::SingleMaterialFinish {
                material: MaterialId(100)
            },
            ConsumerEvent::SingleShaderFinish {
                shader: ShaderId(10)
            },
            ConsumerEvent::FinishGroup { group: g },
            ConsumerEvent::Finish,
        ]
    );
}

#[test]
fn billboards_sit_between_batches_and_singles() {
    let s = shader(0);
    let m = material(0, &s);
    let mut scene = SceneOpaques::new();

    let mut billboards = BillboardedInstance::new(InstanceId(5), MeshHandle(3));
    billboards.push(Billboard {
        position: glam::Vec3::ZERO,
        scale: 1.0,
        rotation: 0.0,
    });
    scene.add_single(single(6, 3), Arc::clone(&m)).unwrap();
    scene
        .add_billboarded(Arc::new(billboards), Arc::clone(&m))
        .unwrap();
    scene
        .add_batched(
            Arc::new(BatchedInstance::new(InstanceId(4), MeshHandle(3), 1)),
            m,
        )
        .unwrap();

    let c = record(&scene);
    let batched = c
        .position(&ConsumerEvent::Batched {
            material: MaterialId(0),
            instance: InstanceId(4),
        })
        .unwrap();
    let billboarded = c
        .position(&ConsumerEvent::Billboarded {
            material: MaterialId(0),
            instance: InstanceId(5),
        })
        .unwrap();
    let single = c
        .position(&ConsumerEvent::Single {
            material: MaterialId(0),
            instance: InstanceId(6),
        })
        .unwrap();
    assert!(batched < billboarded && billboarded < single);
    assert_eq!(
        c.count(|e| matches!(e, ConsumerEvent::BillboardedUpdate { .. })),
        1
    );
}

#[test]
fn duplicate_ids_rejected_in_any_group_or_kind() {
    let s = shader(0);
    let m = material(0, &s);
    let mut scene = SceneOpaques::new();
    scene.add_single(single(9, 0), Arc::clone(&m)).unwrap();

    let other_group = Group::new(5).unwrap();
    let err = scene
        .add_single_in_group(single(9, 1), material(1, &s), other_group)
        .unwrap_err();
    assert!(matches!(
        err,
        SceneError::InstanceAlreadyVisible { instance: InstanceId(9), group } if group == Group::DEFAULT
    ));

    let err = scene
        .add_billboarded_in_group(
            Arc::new(BillboardedInstance::new(InstanceId(9), MeshHandle(0))),
            m,
            other_group,
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "instance 9 is already visible in group 1");
    assert_eq!(scene.count(), 1);
    assert_eq!(record(&scene).groups(), vec![Group::DEFAULT]);
}

#[test]
fn batch_updated_once_per_frame_and_flag_cleared() {
    let s = shader(0);
    let m = material(0, &s);
    let mut scene = SceneOpaques::new();
    let mut batch = BatchedInstance::new(InstanceId(0), MeshHandle(0), 2);
    batch.enable(Mat4::IDENTITY);
    let batch = Arc::new(batch);
    scene
        .add_batched_in_group(Arc::clone(&batch), m, Group::new(2).unwrap())
        .unwrap();

    assert!(batch.update_required());
    let mut consumer = RecordingConsumer::acknowledging();
    scene.execute(&mut consumer);
    assert!(!batch.update_required());
    assert_eq!(
        consumer.count(|e| matches!(e, ConsumerEvent::BatchedUpdate { .. })),
        1
    );
}

#[test]
fn replay_is_byte_identical() {
    init_tracing();
    let mut ids = IdPool::new();
    let shaders: Vec<_> = (0..3).map(|_| Arc::new(RecordingShader::new(ids.fresh_shader()))).collect();
    let materials: Vec<_> = (0..6)
        .map(|i| {
            Arc::new(Material::new(
                ids.fresh_material(),
                Arc::clone(&shaders[i % shaders.len()]),
                [i as f32; 4],
            ))
        })
        .collect();

    let mut scene = SceneOpaques::new();
    for i in 0..60u64 {
        let material = Arc::clone(&materials[(i * 7 % 6) as usize]);
        let group = Group::new((i % 3) as u32 + 1).unwrap();
        let instance = Arc::new(SingleInstance::new(
            ids.fresh_instance(),
            MeshHandle(i % 4),
            Mat4::IDENTITY,
        ));
        scene.add_single_in_group(instance, material, group).unwrap();
    }

    let first = record(&scene).to_json().unwrap();
    let second = record(&scene).to_json().unwrap();
    assert_eq!(first, second);
    assert_eq!(scene.count(), 60);
}

#[test]
fn one_consumer_drained_between_frames_sees_the_same_frame() {
    let s = shader(0);
    let m = material(0, &s);
    let mut scene = SceneOpaques::new();
    for id in 0..4 {
        scene.add_single(single(id, id % 2), Arc::clone(&m)).unwrap();
    }

    let mut consumer = RecordingConsumer::new();
    scene.execute(&mut consumer);
    let first = consumer.take();
    assert!(consumer.events().is_empty());

    scene.execute(&mut consumer);
    let second = consumer.take();
    assert_eq!(first, second);
    assert_eq!(first.first(), Some(&ConsumerEvent::Start));
    assert_eq!(first.last(), Some(&ConsumerEvent::Finish));
}

#[test]
fn reset_leaves_only_start_and_finish() {
    let s = shader(0);
    let m = material(0, &s);
    let mut scene = SceneOpaques::new();
    scene.add_single(single(0, 0), Arc::clone(&m)).unwrap();
    scene
        .add_batched(
            Arc::new(BatchedInstance::new(InstanceId(1), MeshHandle(0), 1)),
            m,
        )
        .unwrap();

    scene.reset();
    assert_eq!(scene.count(), 0);
    assert_eq!(
        record(&scene).events(),
        &[ConsumerEvent::Start, ConsumerEvent::Finish]
    );
    scene.reset();
    assert!(scene.is_empty());
}
