// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use wdm_engine::sim_error;
use wdm_engine::suspend::tick_boundary;
use wdm_engine::task::{ArbitrationTask, TaskFlags, TaskState};
use wdm_engine::test_helpers::start_test;
use wdm_engine::types::{SimError, SimResult};

type Events = Rc<RefCell<Vec<&'static str>>>;

fn new_flags() -> (Rc<TaskFlags>, Rc<TaskFlags>) {
    let flags = Rc::new(TaskFlags::default());
    (flags.clone(), flags)
}

#[test]
fn end_state_stops_the_task() {
    let top = start_test(file!());
    let (flags, task_flags) = new_flags();
    let events: Events = Rc::new(RefCell::new(Vec::new()));
    let task_events = events.clone();
    let mut task = ArbitrationTask::new(&top, flags, async move {
        for _ in 0..3 {
            tick_boundary().await;
        }
        task_flags.set_end_state();
        tick_boundary().await;
        task_events.borrow_mut().push("resumed after end_state");
        Ok(())
    });

    assert!(task.tick().unwrap());
    assert!(task.tick().unwrap());
    assert!(task.tick().unwrap());
    assert!(!task.tick().unwrap());
    assert!(!task.tick().unwrap());
    assert_eq!(task.state(), TaskState::EndedSuccess);
    assert_eq!(task.ticks(), 4);
    assert!(events.borrow().is_empty());
}

#[test]
fn terminal_state_is_stable() {
    let top = start_test(file!());
    let (flags, task_flags) = new_flags();
    let mut task = ArbitrationTask::new(&top, flags, async move {
        task_flags.set_end_state();
        tick_boundary().await;
        Ok(())
    });

    assert!(!task.tick().unwrap());
    for _ in 0..5 {
        assert!(!task.tick().unwrap());
    }
    assert_eq!(task.ticks(), 1);
    assert_eq!(task.state(), TaskState::EndedSuccess);
}

#[test]
fn lock_error_exits_on_the_same_tick() {
    let top = start_test(file!());
    let (flags, task_flags) = new_flags();
    let mut task = ArbitrationTask::new(&top, flags, async move {
        tick_boundary().await;
        task_flags.set_lock_error_state();
        tick_boundary().await;
        Ok(())
    });

    assert!(task.tick().unwrap());
    assert!(!task.tick().unwrap());
    assert_eq!(task.state(), TaskState::EndedError);
    assert!(task.flags().lock_error_state());
    assert!(!task.flags().end_state());
}

#[test]
fn returning_without_a_flag_is_an_error() {
    let top = start_test(file!());
    let (flags, _) = new_flags();
    let mut task = ArbitrationTask::new(&top, flags, async move {
        tick_boundary().await;
        Ok(())
    });

    assert!(task.tick().unwrap());
    assert!(matches!(task.tick(), Err(SimError::Task(_))));
    assert_eq!(task.state(), TaskState::EndedError);
    assert!(!task.flags().end_state());
    assert!(!task.tick().unwrap());
}

#[test]
fn returning_after_end_state_succeeds() {
    let top = start_test(file!());
    let (flags, task_flags) = new_flags();
    let mut task = ArbitrationTask::new(&top, flags, async move {
        tick_boundary().await;
        task_flags.set_end_state();
        Ok(())
    });

    assert!(task.tick().unwrap());
    assert!(!task.tick().unwrap());
    assert_eq!(task.state(), TaskState::EndedSuccess);
}

#[test]
fn errors_abort_the_task() {
    let top = start_test(file!());
    let (flags, _) = new_flags();
    let mut task = ArbitrationTask::new(&top, flags, async move {
        tick_boundary().await;
        sim_error!("algorithm bug")
    });

    assert!(task.tick().unwrap());
    assert_eq!(
        task.tick(),
        Err(SimError::Task("algorithm bug".to_string()))
    );
    assert_eq!(task.state(), TaskState::EndedError);
    assert!(!task.tick().unwrap());
}

async fn inner(events: Events) -> SimResult {
    events.borrow_mut().push("inner start");
    tick_boundary().await;
    events.borrow_mut().push("inner resumed");
    tick_boundary().await;
    events.borrow_mut().push("inner done");
    Ok(())
}

async fn middle(events: Events) -> SimResult {
    events.borrow_mut().push("middle start");
    inner(events.clone()).await?;
    events.borrow_mut().push("middle after inner");
    Ok(())
}

#[test]
fn nested_procedures_forward_suspension() {
    let top = start_test(file!());
    let (flags, task_flags) = new_flags();
    let events: Events = Rc::new(RefCell::new(Vec::new()));
    let task_events = events.clone();
    let mut task = ArbitrationTask::new(&top, flags, async move {
        middle(task_events.clone()).await?;
        task_events.borrow_mut().push("outer after middle");
        task_flags.set_end_state();
        tick_boundary().await;
        Ok(())
    });

    assert!(task.tick().unwrap());
    assert_eq!(*events.borrow(), ["middle start", "inner start"]);
    events.borrow_mut().clear();

    assert!(task.tick().unwrap());
    assert_eq!(*events.borrow(), ["inner resumed"]);
    events.borrow_mut().clear();

    // The parents carry on within the tick in which the child completes.
    assert!(!task.tick().unwrap());
    assert_eq!(
        *events.borrow(),
        ["inner done", "middle after inner", "outer after middle"]
    );
    assert_eq!(task.ticks(), 3);
}

#[test]
fn nested_errors_propagate() {
    let top = start_test(file!());
    let (flags, _) = new_flags();
    let mut task = ArbitrationTask::new(&top, flags, async move {
        async fn failing() -> SimResult {
            tick_boundary().await;
            Err(SimError::NoCandidate("slice 2".to_string()))
        }
        failing().await?;
        Ok(())
    });

    assert!(task.tick().unwrap());
    assert_eq!(
        task.tick(),
        Err(SimError::NoCandidate("slice 2".to_string()))
    );
}
