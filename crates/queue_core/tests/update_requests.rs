use pretty_assertions::assert_eq;
use queue_core::{
    update, Ack, Effect, Msg, QueueState, Request, Response, StatusReport, WakeTrigger,
};

fn request(state: QueueState, request: Request, host_busy: bool) -> (QueueState, Vec<Effect>) {
    update(state, Msg::Request { request, host_busy })
}

fn response(effects: &[Effect]) -> Option<&Response> {
    effects.iter().find_map(|effect| match effect {
        Effect::Respond(response) => Some(response),
        _ => None,
    })
}

fn chain(text: &str) -> Request {
    Request::RunPromptChain {
        chain: Some(text.to_string()),
    }
}

#[test]
fn chain_is_split_and_appended_in_order() {
    let (state, effects) = request(QueueState::new(), chain("write a poem ~ summarize it ~ "), false);

    assert_eq!(state.queue().to_strings(), vec!["write a poem", "summarize it"]);
    assert_eq!(
        effects,
        vec![
            Effect::Notify("✓ Queued 2 prompts".to_string()),
            Effect::ScheduleProcessing {
                trigger: WakeTrigger::Request
            },
            Effect::Respond(Response::Ack(Ack::ok())),
        ]
    );
}

#[test]
fn empty_chain_is_rejected_without_mutation() {
    let (state, _) = request(QueueState::new(), chain("keep me"), true);
    let before = state.clone();

    for body in [Some(""), Some("  ~ ~ "), None] {
        let (next, effects) = request(
            state.clone(),
            Request::RunPromptChain {
                chain: body.map(str::to_string),
            },
            false,
        );
        assert_eq!(next.queue(), before.queue());
        assert_eq!(
            effects,
            vec![Effect::Respond(Response::Ack(Ack::error("Empty chain")))]
        );
    }
}

#[test]
fn enqueue_prompt_trims_and_rejects_blank() {
    let (state, effects) = request(
        QueueState::new(),
        Request::EnqueuePrompt {
            prompt: Some("  one  ".to_string()),
        },
        true,
    );
    assert_eq!(state.queue().to_strings(), vec!["one"]);
    assert_eq!(response(&effects), Some(&Response::Ack(Ack::ok())));

    let (state, effects) = request(
        state,
        Request::EnqueuePrompt {
            prompt: Some("   ".to_string()),
        },
        false,
    );
    assert_eq!(state.len(), 1);
    assert_eq!(
        effects,
        vec![Effect::Respond(Response::Ack(Ack::error("Empty prompt")))]
    );
}

#[test]
fn status_reports_queue_and_flags() {
    let (state, _) = request(QueueState::new(), chain("a ~ b ~ c"), true);
    let (mut state, effects) = request(state, Request::GetStatus, true);
    assert_eq!(
        response(&effects),
        Some(&Response::Status(StatusReport {
            queue: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            is_responding: true,
            is_processing: false,
        }))
    );

    state.begin_cycle().expect("cycle starts");
    let (_state, effects) = request(state, Request::GetStatus, false);
    assert_eq!(
        response(&effects),
        Some(&Response::Status(StatusReport {
            queue: vec!["b".to_string(), "c".to_string()],
            is_responding: false,
            is_processing: true,
        }))
    );
}

#[test]
fn clear_keeps_checked_out_prompt_with_its_cycle() {
    let (mut state, _) = request(QueueState::new(), chain("a ~ b"), true);
    let checked_out = state.begin_cycle().expect("cycle starts");

    let (mut state, effects) = request(state, Request::ClearQueue, false);
    assert!(state.is_empty());
    assert!(state.is_processing());
    assert_eq!(response(&effects), Some(&Response::Ack(Ack::ok())));

    // A failed cycle may still hand its prompt back after the clear.
    state.requeue(checked_out.prompt);
    state.end_cycle();
    assert_eq!(state.queue().to_strings(), vec!["a"]);
}

#[test]
fn every_request_is_answered_exactly_once() {
    let requests = [
        Request::GetStatus,
        Request::ClearQueue,
        chain("a ~ b"),
        chain(" ~ "),
        Request::EnqueuePrompt {
            prompt: Some("c".to_string()),
        },
        Request::EnqueuePrompt { prompt: None },
    ];
    let mut state = QueueState::new();
    for req in requests {
        for host_busy in [false, true] {
            let (next, effects) = request(state, req.clone(), host_busy);
            state = next;
            let replies = effects
                .iter()
                .filter(|effect| matches!(effect, Effect::Respond(_)))
                .count();
            assert_eq!(replies, 1, "{req:?}");
            assert!(matches!(effects.last(), Some(Effect::Respond(_))), "{req:?}");
        }
    }
}
