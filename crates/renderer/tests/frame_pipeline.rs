//! Frame pipeline behavior over a scripted GPU.

mod common;

use std::collections::HashMap;

use common::{Event, Injection, MockGpu, SharedExtent, StaticPayload};
use swapframe_renderer::{
    CommandListId, FenceId, FrameOutcome, FramePipeline, PipelineState, PresentOutcome,
    RenderError,
};
use swapframe_rhi::vk;

fn pipeline(gpu: MockGpu, extent: &SharedExtent) -> FramePipeline<MockGpu> {
    FramePipeline::new(gpu, Box::new(extent.clone()), Box::new(StaticPayload::new()))
        .expect("pipeline should start")
}

fn run(pipeline: &mut FramePipeline<MockGpu>, frames: usize) -> Vec<FrameOutcome> {
    (0..frames)
        .map(|_| pipeline.run_frame().expect("frame should not fail"))
        .collect()
}

fn slot_of(outcome: &FrameOutcome) -> Option<usize> {
    match outcome {
        FrameOutcome::Submitted { slot, .. } => Some(*slot),
        _ => None,
    }
}

/// Command lists recorded after the `n`-th swapchain creation (0-based).
fn lists_of_generation(gpu: &MockGpu, n: usize) -> Vec<CommandListId> {
    let start = gpu
        .log
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, Event::CreateSwapchain { .. }))
        .nth(n)
        .map(|(i, _)| i)
        .expect("swapchain generation exists");

    gpu.log[start..]
        .iter()
        .skip(1)
        .take_while(|e| !matches!(e, Event::CreateSwapchain { .. }))
        .filter_map(|e| match e {
            Event::RecordCommandList { list, .. } => Some(*list),
            _ => None,
        })
        .collect()
}

#[test]
fn test_five_frames_cycle_two_slots() {
    let extent = SharedExtent::new(800, 600);
    let mut pipeline = pipeline(MockGpu::new(2), &extent);
    assert_eq!(pipeline.surface().map(|s| s.image_count()), Some(3));

    let outcomes = run(&mut pipeline, 5);

    let slots: Vec<usize> = outcomes.iter().filter_map(slot_of).collect();
    assert_eq!(slots, vec![0, 1, 0, 1, 0]);
    assert!(outcomes.iter().all(|o| o.presented() && !o.rebuilt()));

    let gpu = pipeline.gpu();
    assert_eq!(gpu.submits().len(), 5);
    assert_eq!(gpu.successful_presents(), 5);
    assert_eq!(gpu.swapchains_created(), 1);
    assert_eq!(pipeline.frame_index(), 5);
    assert_eq!(pipeline.state(), PipelineState::Idle);
}

#[test]
fn test_slot_fence_waited_before_reuse() {
    let extent = SharedExtent::new(800, 600);
    let mut pipeline = pipeline(MockGpu::new(2), &extent);
    run(&mut pipeline, 6);

    let mut waited: HashMap<FenceId, bool> = HashMap::new();
    for event in &pipeline.gpu().log {
        match event {
            Event::WaitFence { fence, .. } => {
                waited.insert(*fence, true);
            }
            Event::Submit(submission) => {
                assert_eq!(
                    waited.insert(submission.fence, false),
                    Some(true),
                    "fence {:?} submitted without a wait since its last use",
                    submission.fence
                );
            }
            _ => {}
        }
    }

    // Frames 2.. reuse a slot whose submission was still pending
    let blocked = pipeline
        .gpu()
        .count(|e| matches!(e, Event::WaitFence { blocked: true, .. }));
    assert!(blocked >= 4, "expected slot waits to block, got {}", blocked);
}

#[test]
fn test_reacquired_image_waits_on_claiming_fence() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    // Frame 2 runs on slot 0 but gets image 1, last claimed by slot 1
    gpu.script_acquires(&[0, 1, 1]);
    let mut pipeline = pipeline(gpu, &extent);
    run(&mut pipeline, 3);

    let gpu = pipeline.gpu();
    let submits = gpu.submits();
    let slot1_fence = submits[1].fence;
    assert_ne!(submits[0].fence, slot1_fence);

    let acquires: Vec<usize> = gpu
        .log
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, Event::Acquire { .. }))
        .map(|(i, _)| i)
        .collect();
    let third_write = gpu
        .log
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, Event::WriteFrameData { .. }))
        .nth(2)
        .map(|(i, _)| i)
        .expect("third frame wrote its payload");

    let between = &gpu.log[acquires[2]..third_write];
    assert!(
        between.contains(&Event::WaitFence {
            fence: slot1_fence,
            blocked: true
        }),
        "image 1 written before its claiming fence completed: {:?}",
        between
    );
    assert_eq!(pipeline.tracker().claim(1), Some(submits[2].fence));
}

#[test]
fn test_unclaimed_image_does_not_wait() {
    let extent = SharedExtent::new(800, 600);
    let mut pipeline = pipeline(MockGpu::new(2), &extent);
    run(&mut pipeline, 3);

    let gpu = pipeline.gpu();
    let third_acquire = gpu
        .log
        .iter()
        .rposition(|e| matches!(e, Event::Acquire { image: 2 }))
        .expect("image 2 acquired");
    let next = &gpu.log[third_acquire + 1];
    assert_eq!(next, &Event::WriteFrameData { image: 2 });
}

#[test]
fn test_resize_rebuilds_to_polled_extent() {
    let extent = SharedExtent::new(800, 600);
    let mut pipeline = pipeline(MockGpu::new(2), &extent);
    run(&mut pipeline, 1);

    // A changed extent alone does nothing until notified
    extent.set(1024, 768);
    assert!(!pipeline.run_frame().unwrap().rebuilt());
    assert_eq!(
        pipeline.surface().unwrap().extent(),
        vk::Extent2D {
            width: 800,
            height: 600
        }
    );

    pipeline.notify_resized();
    let outcome = pipeline.run_frame().unwrap();
    assert!(outcome.rebuilt());
    assert!(outcome.presented());
    assert_eq!(
        pipeline.surface().unwrap().extent(),
        vk::Extent2D {
            width: 1024,
            height: 768
        }
    );
    assert_eq!(pipeline.surface().unwrap().generation(), 1);
}

#[test]
fn test_resize_clamps_to_surface_limits() {
    let extent = SharedExtent::new(800, 600);
    let mut pipeline = pipeline(MockGpu::new(2), &extent);

    extent.set(5000, 100);
    pipeline.notify_resized();
    pipeline.run_frame().unwrap();

    assert_eq!(
        pipeline.surface().unwrap().extent(),
        vk::Extent2D {
            width: 4096,
            height: 100
        }
    );
}

#[test]
fn test_surface_uses_current_extent_when_defined() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.support.capabilities.current_extent = vk::Extent2D {
        width: 640,
        height: 480,
    };
    let pipeline = pipeline(gpu, &extent);

    assert_eq!(
        pipeline.surface().unwrap().extent(),
        vk::Extent2D {
            width: 640,
            height: 480
        }
    );
}

#[test]
fn test_out_of_date_acquire_on_third_of_five() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.inject_acquire(3, Injection::OutOfDate);
    let mut pipeline = pipeline(gpu, &extent);

    let outcomes = run(&mut pipeline, 5);

    assert_eq!(outcomes[2], FrameOutcome::Rebuilt);
    assert_eq!(outcomes.iter().filter(|o| o.rebuilt()).count(), 1);

    let gpu = pipeline.gpu();
    assert_eq!(gpu.successful_presents(), 4);
    assert_eq!(gpu.submits().len(), 4);
    assert_eq!(gpu.swapchains_created(), 2);

    // Iterations 4 and 5 replay lists recorded for the new generation
    let old_lists = lists_of_generation(gpu, 0);
    let new_lists = lists_of_generation(gpu, 1);
    let submits = gpu.submits();
    assert!(submits[..2].iter().all(|s| old_lists.contains(&s.command_list)));
    assert!(submits[2..].iter().all(|s| new_lists.contains(&s.command_list)));
    assert_eq!(pipeline.surface().unwrap().generation(), 1);

    // The failed acquire did not advance the frame
    assert_eq!(pipeline.frame_index(), 4);
}

#[test]
fn test_out_of_date_present_rebuilds_once() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.inject_present(3, Injection::OutOfDate);
    let mut pipeline = pipeline(gpu, &extent);

    let outcomes = run(&mut pipeline, 5);

    assert!(matches!(
        outcomes[2],
        FrameOutcome::Submitted {
            presented: false,
            rebuilt: true,
            ..
        }
    ));
    assert_eq!(outcomes.iter().filter(|o| o.rebuilt()).count(), 1);

    let gpu = pipeline.gpu();
    assert_eq!(gpu.successful_presents(), 4);
    assert_eq!(gpu.submits().len(), 5);
    assert_eq!(gpu.swapchains_created(), 2);

    // Exactly one rebuild sits between the failed present and the next good one
    let failed = gpu
        .log
        .iter()
        .position(|e| {
            matches!(
                e,
                Event::Present {
                    outcome: PresentOutcome::OutOfDate,
                    ..
                }
            )
        })
        .expect("present 3 reported out of date");
    let next_good = failed
        + 1
        + gpu.log[failed + 1..]
            .iter()
            .position(|e| matches!(e, Event::Present { .. }))
            .expect("a later present");
    let rebuilds_between = gpu.log[failed..next_good]
        .iter()
        .filter(|e| matches!(e, Event::CreateSwapchain { .. }))
        .count();
    assert_eq!(rebuilds_between, 1);
}

#[test]
fn test_suboptimal_acquire_presents_then_rebuilds() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.inject_acquire(2, Injection::Suboptimal);
    let mut pipeline = pipeline(gpu, &extent);

    let outcomes = run(&mut pipeline, 3);

    assert!(outcomes[1].presented());
    assert!(outcomes[1].rebuilt());
    assert!(!outcomes[2].rebuilt());
    assert_eq!(pipeline.gpu().swapchains_created(), 2);
}

#[test]
fn test_suboptimal_present_rebuilds() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.inject_present(1, Injection::Suboptimal);
    let mut pipeline = pipeline(gpu, &extent);

    let outcome = pipeline.run_frame().unwrap();
    assert!(outcome.presented());
    assert!(outcome.rebuilt());
}

#[test]
fn test_resize_and_out_of_date_collapse_into_one_rebuild() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.inject_present(1, Injection::OutOfDate);
    let mut pipeline = pipeline(gpu, &extent);

    extent.set(1280, 720);
    pipeline.notify_resized();
    let outcome = pipeline.run_frame().unwrap();

    assert!(outcome.rebuilt());
    assert_eq!(pipeline.gpu().swapchains_created(), 2);

    // Nothing left pending for the following frame
    assert!(!pipeline.run_frame().unwrap().rebuilt());
}

#[test]
fn test_zero_extent_suspends_until_visible() {
    let extent = SharedExtent::new(800, 600);
    let mut pipeline = pipeline(MockGpu::new(2), &extent);
    run(&mut pipeline, 2);

    let submits_before = pipeline.gpu().submits().len();
    let presents_before = pipeline.gpu().successful_presents();
    let waits_before = pipeline
        .gpu()
        .count(|e| matches!(e, Event::WaitFence { .. }));

    extent.set(0, 0);
    pipeline.notify_resized();
    let outcome = pipeline.run_frame().unwrap();
    assert_eq!(outcome, FrameOutcome::TornDown);
    assert!(outcome.rebuilt());
    assert!(!outcome.presented());
    assert!(pipeline.surface().is_none());
    assert_eq!(pipeline.state(), PipelineState::Suspended);
    assert!(!pipeline.gpu().has_swapchain());
    assert_eq!(pipeline.gpu().submits().len(), submits_before);
    assert_eq!(pipeline.gpu().successful_presents(), presents_before);
    assert_eq!(
        pipeline
            .gpu()
            .count(|e| matches!(e, Event::WaitFence { .. })),
        waits_before
    );
    assert_eq!(pipeline.gpu().count(|e| *e == Event::DestroySwapchain), 1);

    for _ in 0..3 {
        assert_eq!(pipeline.run_frame().unwrap(), FrameOutcome::Suspended);
    }
    assert_eq!(pipeline.gpu().submits().len(), submits_before);
    assert_eq!(pipeline.gpu().successful_presents(), presents_before);
    assert_eq!(pipeline.gpu().swapchains_created(), 1);

    extent.set(640, 480);
    let outcome = pipeline.run_frame().unwrap();
    assert!(outcome.rebuilt());
    assert!(outcome.presented());
    assert_eq!(pipeline.gpu().swapchains_created(), 2);
    assert_eq!(
        pipeline.surface().unwrap().extent(),
        vk::Extent2D {
            width: 640,
            height: 480
        }
    );

    assert!(!pipeline.run_frame().unwrap().rebuilt());
    assert_eq!(pipeline.gpu().swapchains_created(), 2);
    assert_eq!(pipeline.gpu().count(|e| *e == Event::DestroySwapchain), 1);
}

#[test]
fn test_zero_extent_without_resize_event_submits_nothing() {
    let extent = SharedExtent::new(800, 600);
    let mut pipeline = pipeline(MockGpu::new(2), &extent);
    run(&mut pipeline, 1);
    let submits_before = pipeline.gpu().submits().len();

    // No notify_resized: the poll alone must stop the frame
    extent.set(0, 0);
    let outcome = pipeline.run_frame().unwrap();

    assert!(outcome.suspended());
    assert!(outcome.rebuilt());
    assert_eq!(pipeline.gpu().submits().len(), submits_before);
    assert_eq!(pipeline.gpu().successful_presents(), 1);
    assert_eq!(pipeline.gpu().count(|e| matches!(e, Event::Acquire { .. })), 1);
    assert!(!pipeline.gpu().has_swapchain());
    assert_eq!(pipeline.gpu().live_command_lists(), 0);
}

#[test]
fn test_zero_surface_extent_suspends_instead_of_creating() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    // Minimized window: the surface reports a defined 0x0 extent
    gpu.support.capabilities.current_extent = vk::Extent2D {
        width: 0,
        height: 0,
    };
    let mut pipeline = pipeline(gpu, &extent);

    assert!(pipeline.surface().is_none());
    assert_eq!(pipeline.state(), PipelineState::Suspended);
    assert_eq!(pipeline.gpu().swapchains_created(), 0);
    assert_eq!(pipeline.run_frame().unwrap(), FrameOutcome::Suspended);
    assert!(pipeline.gpu().submits().is_empty());

    pipeline.gpu_mut().support.capabilities.current_extent = vk::Extent2D {
        width: 800,
        height: 600,
    };
    let outcome = pipeline.run_frame().unwrap();
    assert!(outcome.rebuilt());
    assert!(outcome.presented());
    assert_eq!(
        pipeline.surface().unwrap().extent(),
        vk::Extent2D {
            width: 800,
            height: 600
        }
    );
}

#[test]
fn test_zero_extent_at_startup() {
    let extent = SharedExtent::new(0, 0);
    let mut pipeline = pipeline(MockGpu::new(2), &extent);

    assert_eq!(pipeline.state(), PipelineState::Suspended);
    assert_eq!(pipeline.run_frame().unwrap(), FrameOutcome::Suspended);
    assert_eq!(pipeline.gpu().swapchains_created(), 0);

    extent.set(320, 240);
    let outcome = pipeline.run_frame().unwrap();
    assert!(outcome.rebuilt());
    assert_eq!(pipeline.gpu().swapchains_created(), 1);
}

#[test]
fn test_rebuild_tears_down_in_order() {
    let extent = SharedExtent::new(800, 600);
    let mut pipeline = pipeline(MockGpu::new(2), &extent);
    pipeline.notify_resized();
    pipeline.run_frame().unwrap();

    let gpu = pipeline.gpu();
    let teardown: Vec<&Event> = gpu
        .log
        .iter()
        .skip_while(|e| !matches!(e, Event::Present { .. }))
        .skip(1)
        .take_while(|e| !matches!(e, Event::CreateSwapchain { .. }))
        .collect();

    assert_eq!(teardown.len(), 6, "{:?}", teardown);
    assert_eq!(teardown[0], &Event::WaitIdle);
    assert!(
        teardown[1..4]
            .iter()
            .all(|e| matches!(e, Event::FreeCommandList(_)))
    );
    assert_eq!(teardown[4], &Event::DestroyAttachments);
    assert_eq!(teardown[5], &Event::DestroySwapchain);
}

#[test]
fn test_rebuild_resets_tracker() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.extra_images = 1;
    let mut pipeline = pipeline(gpu, &extent);
    run(&mut pipeline, 3);
    assert!(pipeline.tracker().claim(0).is_some());

    pipeline.gpu_mut().extra_images = 2;
    pipeline.notify_resized();
    pipeline.run_frame().unwrap();

    assert_eq!(pipeline.surface().unwrap().image_count(), 5);
    assert_eq!(pipeline.tracker().len(), 5);
    assert!((0..5).all(|i| pipeline.tracker().claim(i).is_none()));
}

#[test]
fn test_device_lost_is_fatal_with_stage() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.inject_submit(2, Injection::DeviceLost);
    let mut pipeline = pipeline(gpu, &extent);

    pipeline.run_frame().unwrap();
    let err = pipeline.run_frame().unwrap_err();
    match err {
        RenderError::DeviceError { stage, source } => {
            assert_eq!(stage, PipelineState::Submitting);
            assert_eq!(source.vk_result(), Some(vk::Result::ERROR_DEVICE_LOST));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_device_lost_on_acquire_and_present() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.inject_acquire(1, Injection::DeviceLost);
    gpu.inject_present(1, Injection::DeviceLost);
    let mut pipeline = pipeline(gpu, &extent);

    assert!(matches!(
        pipeline.run_frame(),
        Err(RenderError::DeviceError {
            stage: PipelineState::Acquiring,
            ..
        })
    ));
    assert!(matches!(
        pipeline.run_frame(),
        Err(RenderError::DeviceError {
            stage: PipelineState::Presenting,
            ..
        })
    ));
}

#[test]
fn test_empty_surface_formats_is_configuration_error() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.support.formats.clear();

    let result = FramePipeline::new(gpu, Box::new(extent), Box::new(StaticPayload::new()));
    assert!(matches!(result, Err(RenderError::ConfigurationError(_))));
}

#[test]
fn test_empty_present_modes_is_configuration_error() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.support.present_modes.clear();

    let result = FramePipeline::new(gpu, Box::new(extent), Box::new(StaticPayload::new()));
    assert!(matches!(result, Err(RenderError::ConfigurationError(_))));
}

#[test]
fn test_shutdown_releases_everything() {
    let extent = SharedExtent::new(800, 600);
    let mut pipeline = pipeline(MockGpu::new(2), &extent);
    run(&mut pipeline, 4);

    pipeline.shutdown().unwrap();
    let gpu = pipeline.gpu();
    assert_eq!(gpu.live_fences(), 0);
    assert_eq!(gpu.live_semaphores(), 0);
    assert_eq!(gpu.live_command_lists(), 0);
    assert!(!gpu.has_swapchain());
    assert_eq!(pipeline.state(), PipelineState::ShuttingDown);

    assert!(matches!(pipeline.run_frame(), Err(RenderError::ShutDown)));
    // A second shutdown is a no-op
    pipeline.shutdown().unwrap();
}

#[test]
fn test_auto_complete_fences_never_block() {
    let extent = SharedExtent::new(800, 600);
    let mut gpu = MockGpu::new(2);
    gpu.auto_complete = true;
    let mut pipeline = pipeline(gpu, &extent);
    run(&mut pipeline, 5);

    let gpu = pipeline.gpu();
    assert_eq!(gpu.count(|e| matches!(e, Event::WaitFence { blocked: true, .. })), 0);
    assert_eq!(gpu.successful_presents(), 5);
}
