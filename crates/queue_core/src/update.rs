use crate::{split_chain, Ack, Effect, Msg, Prompt, QueueState, Request, Response, WakeTrigger};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: QueueState, msg: Msg) -> (QueueState, Vec<Effect>) {
    let effects = match msg {
        Msg::EnterPressed { text, host_busy } => {
            let Some(prompt) = Prompt::parse(&text) else {
                return (state, Vec::new());
            };
            state.enqueue(prompt);
            let notice = if host_busy {
                format!("✓ Queued ({}) - assistant is busy", state.len())
            } else {
                format!("✓ Queued ({})", state.len())
            };
            let mut effects = vec![Effect::ClearInput, Effect::Notify(notice)];
            if !host_busy && !state.is_processing() {
                effects.push(Effect::ScheduleProcessing {
                    trigger: WakeTrigger::Keystroke,
                });
            }
            effects
        }
        Msg::Request { request, host_busy } => handle_request(&mut state, request, host_busy),
        Msg::MutationsObserved { host_busy } => {
            if state.wants_cycle(host_busy) {
                vec![Effect::ScheduleProcessing {
                    trigger: WakeTrigger::Mutation,
                }]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}

fn handle_request(state: &mut QueueState, request: Request, host_busy: bool) -> Vec<Effect> {
    match request {
        Request::GetStatus => vec![Effect::Respond(Response::Status(state.status(host_busy)))],
        Request::ClearQueue => {
            state.clear_queue();
            vec![
                Effect::Notify("🗑️ Queue cleared".to_string()),
                Effect::Respond(Response::Ack(Ack::ok())),
            ]
        }
        Request::RunPromptChain { chain } => {
            let prompts = split_chain(chain.as_deref().unwrap_or_default());
            if prompts.is_empty() {
                return vec![Effect::Respond(Response::Ack(Ack::error("Empty chain")))];
            }
            let count = prompts.len();
            state.enqueue_all(prompts);
            accepted(state, host_busy, format!("✓ Queued {count} prompts"))
        }
        Request::EnqueuePrompt { prompt } => {
            let Some(prompt) = prompt.as_deref().and_then(Prompt::parse) else {
                return vec![Effect::Respond(Response::Ack(Ack::error("Empty prompt")))];
            };
            state.enqueue(prompt);
            let notice = format!("✓ Queued ({})", state.len());
            accepted(state, host_busy, notice)
        }
    }
}

fn accepted(state: &QueueState, host_busy: bool, notice: String) -> Vec<Effect> {
    let mut effects = vec![Effect::Notify(notice)];
    if !host_busy && !state.is_processing() {
        effects.push(Effect::ScheduleProcessing {
            trigger: WakeTrigger::Request,
        });
    }
    effects.push(Effect::Respond(Response::Ack(Ack::ok())));
    effects
}
