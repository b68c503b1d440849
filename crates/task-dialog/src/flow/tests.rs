use super::messages;
use super::*;
use crate::{Movement, SessionResultMode, TaskState};
use async_trait::async_trait;
use intent_recognizer::{
    EntityCategory, Intent, RecognitionResult, RecognizerError, ScriptedRecognizer,
};
use robot_gateway::{GatewayCall, MockGateway, MoveDirective};

fn config() -> DialogConfig {
    DialogConfig {
        randomize_follow_up: false,
        ..DialogConfig::default()
    }
}

fn orchestrator(
    gateway: &Arc<MockGateway>,
    recognizer: Arc<dyn Recognizer>,
    config: DialogConfig,
) -> Orchestrator {
    Orchestrator::new(gateway.clone(), recognizer, config).unwrap()
}

fn scripted(results: impl IntoIterator<Item = RecognitionResult>) -> Arc<ScriptedRecognizer> {
    Arc::new(ScriptedRecognizer::new(results))
}

fn awaiting_command(object_position: Option<&str>) -> ConversationRecord {
    ConversationRecord {
        task: TaskState {
            robot_id: Some("7".to_string()),
            pending_movement: None,
            object_position: object_position.map(str::to_string),
        },
        step: DialogStep::AwaitingCommand,
        ..ConversationRecord::default()
    }
}

fn move_request(object: &str, destination: &str) -> RecognitionResult {
    RecognitionResult::new(format!("move the {object} to the {destination}"))
        .with_intent(Intent::Move, 0.92)
        .with_intent(Intent::None, 0.05)
        .with_entity(EntityCategory::Object, object)
        .with_entity(EntityCategory::Destination, destination)
}

fn move_calls(gateway: &MockGateway) -> Vec<GatewayCall> {
    gateway
        .calls()
        .into_iter()
        .filter(|c| matches!(c, GatewayCall::MoveDirective { .. }))
        .collect()
}

const FOLLOW_UP: &str = "What else can I do?";

struct FailingRecognizer;

#[async_trait]
impl Recognizer for FailingRecognizer {
    fn is_configured(&self) -> bool {
        true
    }

    async fn recognize(
        &self,
        _utterance: &str,
        _ctx: &CallContext,
    ) -> intent_recognizer::Result<RecognitionResult> {
        Err(RecognizerError::Status(503))
    }
}

#[tokio::test]
async fn no_robots_ends_flow_without_recognizing() {
    let gateway = Arc::new(MockGateway::new());
    let recognizer = scripted([]);
    let orch = orchestrator(&gateway, recognizer.clone(), config());

    let (record, out) = orch
        .begin(ConversationRecord::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out.texts(), vec![messages::NO_ROBOTS]);
    assert_eq!(out.status, TurnStatus::FlowEnded);
    assert_eq!(record.step, DialogStep::Idle);
    assert_eq!(record.task.robot_id, None);
    assert_eq!(recognizer.call_count(), 0);
}

#[tokio::test]
async fn intro_binds_first_local_robot() {
    let gateway = Arc::new(MockGateway::new().with_robots(vec![
        MockGateway::robot(3, "10.0.0.5"),
        MockGateway::robot(7, "localhost"),
        MockGateway::robot(9, "localhost"),
    ]));
    let orch = orchestrator(&gateway, scripted([]), config());

    let (record, out) = orch
        .begin(ConversationRecord::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(record.task.robot_id.as_deref(), Some("7"));
    assert_eq!(record.step, DialogStep::AwaitingCommand);
    assert_eq!(
        out.messages,
        vec![Message {
            kind: MessageKind::Prompt,
            text: DialogConfig::default().greeting,
        }]
    );
    assert_eq!(out.status, TurnStatus::AwaitingInput);
    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::ListAvailableRobots,
            GatewayCall::Heartbeat {
                robot_id: "7".to_string(),
                access_key: uuid_nil(),
            },
        ]
    );
}

fn uuid_nil() -> String {
    "00000000-0000-0000-0000-000000000000".to_string()
}

#[tokio::test]
async fn failed_heartbeat_reports_no_robots() {
    let gateway = Arc::new(MockGateway::with_local_robot(7).with_heartbeat(false));
    let orch = orchestrator(&gateway, scripted([]), config());

    let (record, out) = orch
        .begin(ConversationRecord::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out.texts(), vec![messages::NO_ROBOTS]);
    assert_eq!(record.step, DialogStep::Idle);
    assert_eq!(record.task.robot_id, None);
}

#[tokio::test]
async fn robot_at_other_address_is_not_bound() {
    let gateway = Arc::new(MockGateway::new().with_robots(vec![MockGateway::robot(3, "10.0.0.5")]));
    let orch = orchestrator(&gateway, scripted([]), config());

    let (_, out) = orch
        .begin(ConversationRecord::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out.texts(), vec![messages::NO_ROBOTS]);
    assert_eq!(gateway.count(|c| matches!(c, GatewayCall::Heartbeat { .. })), 0);
}

#[tokio::test]
async fn unconfigured_recognizer_is_fatal() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let orch = orchestrator(
        &gateway,
        Arc::new(ScriptedRecognizer::unconfigured()),
        config(),
    );

    let err = orch
        .begin(ConversationRecord::default(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DialogError::RecognizerNotConfigured));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn turn_on_calls_start_session_once() {
    let gateway = Arc::new(MockGateway::with_local_robot(7).with_session_results(false, true));
    let recognizer = scripted([RecognitionResult::new("turn it on").with_intent(Intent::TurnOn, 0.9)]);
    let orch = orchestrator(&gateway, recognizer.clone(), config());

    let (record, out) = orch
        .handle_turn(awaiting_command(None), "turn it on", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        out.texts(),
        vec![messages::TURNING_ON, messages::POWERED_ON, FOLLOW_UP]
    );
    assert_eq!(
        gateway.count(|c| c
            == &GatewayCall::StartSession {
                robot_id: "7".to_string()
            }),
        1
    );
    assert_eq!(recognizer.utterances(), vec!["turn it on".to_string()]);
    assert_eq!(record.step, DialogStep::AwaitingCommand);
}

#[tokio::test]
async fn repeated_turn_on_is_idempotent() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let turn_on = RecognitionResult::new("turn it on").with_intent(Intent::TurnOn, 0.9);
    let recognizer = scripted([turn_on.clone(), turn_on]);
    let orch = orchestrator(&gateway, recognizer, config());
    let cancel = CancellationToken::new();

    let (record, first) = orch
        .handle_turn(awaiting_command(Some("cold")), "turn it on", &cancel)
        .await
        .unwrap();
    let (record, second) = orch.handle_turn(record, "turn it on", &cancel).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(record.task.object_position.as_deref(), Some("cold"));
    assert_eq!(gateway.count(|c| matches!(c, GatewayCall::StartSession { .. })), 2);
}

#[tokio::test]
async fn strict_mode_reports_failed_session_calls() {
    let gateway = Arc::new(MockGateway::with_local_robot(7).with_session_results(false, false));
    let recognizer = scripted([
        RecognitionResult::new("turn it on").with_intent(Intent::TurnOn, 0.9),
        RecognitionResult::new("turn it off").with_intent(Intent::TurnOff, 0.9),
    ]);
    let config = DialogConfig {
        session_result_mode: SessionResultMode::Strict,
        ..config()
    };
    let orch = orchestrator(&gateway, recognizer, config);
    let cancel = CancellationToken::new();

    let (record, on) = orch
        .handle_turn(awaiting_command(None), "turn it on", &cancel)
        .await
        .unwrap();
    assert_eq!(
        on.texts(),
        vec![messages::TURNING_ON, messages::POWER_ON_FAILED, FOLLOW_UP]
    );

    let (_, off) = orch.handle_turn(record, "turn it off", &cancel).await.unwrap();
    assert_eq!(
        off.texts(),
        vec![messages::TURNING_OFF, messages::POWER_OFF_FAILED, FOLLOW_UP]
    );
}

#[tokio::test]
async fn turn_off_calls_stop_session() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let recognizer = scripted([RecognitionResult::new("switch off").with_intent(Intent::TurnOff, 0.8)]);
    let orch = orchestrator(&gateway, recognizer, config());

    let (_, out) = orch
        .handle_turn(awaiting_command(None), "switch off", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        out.texts(),
        vec![messages::TURNING_OFF, messages::POWERED_OFF, FOLLOW_UP]
    );
    assert_eq!(
        gateway.count(|c| matches!(c, GatewayCall::StopSession { robot_id } if robot_id == "7")),
        1
    );
}

#[tokio::test]
async fn help_and_unrecognized_continue_the_conversation() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let recognizer = scripted([
        RecognitionResult::new("what can you do").with_intent(Intent::Help, 0.7),
        RecognitionResult::new("sing").with_intent(Intent::Move, 0.0),
    ]);
    let orch = orchestrator(&gateway, recognizer, config());
    let cancel = CancellationToken::new();

    let (record, help) = orch
        .handle_turn(awaiting_command(None), "what can you do", &cancel)
        .await
        .unwrap();
    assert_eq!(help.texts(), vec![messages::HELP, FOLLOW_UP]);

    let (record, unknown) = orch.handle_turn(record, "sing", &cancel).await.unwrap();
    assert_eq!(
        unknown.texts(),
        vec![
            "Sorry, did not compute. Please try asking in a different way (intent was None)",
            FOLLOW_UP,
        ]
    );
    assert_eq!(record.step, DialogStep::AwaitingCommand);
}

#[tokio::test]
async fn recognizer_failure_apologizes_and_restarts() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let orch = orchestrator(&gateway, Arc::new(FailingRecognizer), config());

    let (record, out) = orch
        .handle_turn(awaiting_command(None), "hello", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out.texts(), vec![messages::RECOGNIZER_UNAVAILABLE, FOLLOW_UP]);
    assert_eq!(record.step, DialogStep::AwaitingCommand);
}

#[tokio::test]
async fn move_asks_for_position_before_moving() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let recognizer = scripted([move_request("box", "cold side")]);
    let orch = orchestrator(&gateway, recognizer, config());

    let (record, out) = orch
        .handle_turn(
            awaiting_command(None),
            "move the box to the cold side",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        out.messages,
        vec![Message {
            kind: MessageKind::Prompt,
            text: messages::WHERE_IS_OBJECT.to_string(),
        }]
    );
    assert_eq!(out.status, TurnStatus::AwaitingInput);
    assert_eq!(
        record.task.pending_movement,
        Some(Movement::new("box", "cold side"))
    );
    assert!(matches!(
        record.step,
        DialogStep::AwaitingPosition { attempts: 0, .. }
    ));
    assert!(move_calls(&gateway).is_empty());
}

#[tokio::test]
async fn position_reply_drives_hot_to_cold_move() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let recognizer = scripted([move_request("box", "cold area")]);
    let orch = orchestrator(&gateway, recognizer, config());
    let cancel = CancellationToken::new();

    let (record, _) = orch
        .handle_turn(awaiting_command(None), "move the box to the cold area", &cancel)
        .await
        .unwrap();
    let (record, out) = orch
        .handle_turn(record, "over here, kind of hot", &cancel)
        .await
        .unwrap();

    assert_eq!(
        out.texts(),
        vec![
            "Position set to over here, kind of hot.",
            "Okay, moving box to cold area",
            "I've finished moving box to cold area",
            FOLLOW_UP,
        ]
    );
    assert_eq!(
        move_calls(&gateway),
        vec![GatewayCall::MoveDirective {
            robot_id: "7".to_string(),
            actuator_index: 1,
            directive: MoveDirective::HotToCold,
        }]
    );
    assert_eq!(record.task.object_position.as_deref(), Some("cold area"));
    assert_eq!(record.task.pending_movement, None);
    assert_eq!(record.step, DialogStep::AwaitingCommand);
}

#[tokio::test]
async fn position_reply_is_stored_as_given() {
    let gateway = Arc::new(MockGateway::with_local_robot(7).with_move_result(false));
    let recognizer = scripted([move_request("box", "cold side")]);
    let orch = orchestrator(&gateway, recognizer, config());
    let cancel = CancellationToken::new();

    let (record, _) = orch
        .handle_turn(awaiting_command(None), "move the box", &cancel)
        .await
        .unwrap();
    let (record, _) = orch
        .handle_turn(record, "  Over there, kind of HOT ", &cancel)
        .await
        .unwrap();

    assert_eq!(
        record.task.object_position.as_deref(),
        Some("  Over there, kind of HOT ")
    );
}

#[tokio::test]
async fn begin_discards_a_suspended_movement() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let orch = orchestrator(&gateway, scripted([]), config());
    let movement = Movement::new("box", "cold side");
    let mut record = awaiting_command(None);
    record.task.pending_movement = Some(movement.clone());
    record.step = DialogStep::AwaitingPosition {
        movement,
        attempts: 1,
    };

    let (record, out) = orch.begin(record, &CancellationToken::new()).await.unwrap();

    assert_eq!(record.step, DialogStep::AwaitingCommand);
    assert_eq!(record.task.pending_movement, None);
    assert!(!out.texts().contains(&messages::WHERE_IS_OBJECT));
}

#[tokio::test]
async fn known_position_skips_the_prompt() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let recognizer = scripted([move_request("cup", "hot side")]);
    let orch = orchestrator(&gateway, recognizer, config());

    let (record, out) = orch
        .handle_turn(
            awaiting_command(Some("cold")),
            "move the cup to the hot side",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!out.texts().contains(&messages::WHERE_IS_OBJECT));
    assert_eq!(
        move_calls(&gateway),
        vec![GatewayCall::MoveDirective {
            robot_id: "7".to_string(),
            actuator_index: 1,
            directive: MoveDirective::ColdToHot,
        }]
    );
    assert_eq!(record.task.object_position.as_deref(), Some("hot side"));
}

#[tokio::test]
async fn mild_position_is_unsupported() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let recognizer = scripted([move_request("box", "cold side")]);
    let orch = orchestrator(&gateway, recognizer, config());
    let cancel = CancellationToken::new();

    let (record, _) = orch
        .handle_turn(awaiting_command(None), "move the box", &cancel)
        .await
        .unwrap();
    let (record, out) = orch.handle_turn(record, "the Mild one", &cancel).await.unwrap();

    assert_eq!(out.texts(), vec![messages::MILD_UNSUPPORTED, FOLLOW_UP]);
    assert_eq!(record.task.object_position, None);
    assert_eq!(record.task.pending_movement, None);
    assert!(move_calls(&gateway).is_empty());
}

#[tokio::test]
async fn invalid_position_reprompts_until_attempts_run_out() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let recognizer = scripted([move_request("box", "cold side")]);
    let config = DialogConfig {
        max_position_attempts: Some(2),
        ..config()
    };
    let orch = orchestrator(&gateway, recognizer, config);
    let cancel = CancellationToken::new();

    let (record, _) = orch
        .handle_turn(awaiting_command(None), "move the box", &cancel)
        .await
        .unwrap();

    let (record, out) = orch.handle_turn(record, "nowhere", &cancel).await.unwrap();
    assert_eq!(
        out.texts(),
        vec![messages::INVALID_POSITION, messages::WHERE_IS_OBJECT]
    );
    assert_eq!(
        record.step,
        DialogStep::AwaitingPosition {
            movement: Movement::new("box", "cold side"),
            attempts: 1,
        }
    );

    let (record, out) = orch.handle_turn(record, "no idea", &cancel).await.unwrap();
    assert_eq!(
        out.texts(),
        vec![
            messages::INVALID_POSITION,
            messages::POSITION_GAVE_UP,
            FOLLOW_UP
        ]
    );
    assert_eq!(record.task.pending_movement, None);
    assert_eq!(record.step, DialogStep::AwaitingCommand);
}

#[tokio::test]
async fn unbounded_attempts_keep_asking() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let recognizer = scripted([move_request("box", "cold side")]);
    let config = DialogConfig {
        max_position_attempts: None,
        ..config()
    };
    let orch = orchestrator(&gateway, recognizer, config);
    let cancel = CancellationToken::new();

    let (mut record, _) = orch
        .handle_turn(awaiting_command(None), "move the box", &cancel)
        .await
        .unwrap();
    for _ in 0..5 {
        let (next, out) = orch.handle_turn(record, "dunno", &cancel).await.unwrap();
        assert_eq!(out.status, TurnStatus::AwaitingInput);
        record = next;
    }
    assert!(matches!(
        record.step,
        DialogStep::AwaitingPosition { attempts: 5, .. }
    ));
}

#[tokio::test]
async fn failed_move_keeps_position() {
    let gateway = Arc::new(MockGateway::with_local_robot(7).with_move_result(false));
    let recognizer = scripted([move_request("box", "cold side")]);
    let orch = orchestrator(&gateway, recognizer, config());

    let (record, out) = orch
        .handle_turn(
            awaiting_command(Some("hot")),
            "move the box",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        out.texts(),
        vec!["Okay, moving box to cold side", messages::MOVE_FAILED, FOLLOW_UP]
    );
    assert_eq!(record.task.object_position.as_deref(), Some("hot"));
    assert_eq!(record.task.pending_movement, None);
}

#[tokio::test]
async fn unresolvable_moves_are_rejected() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let recognizer = scripted([
        move_request("box", "hot zone"),
        RecognitionResult::new("move it").with_intent(Intent::Move, 0.8),
    ]);
    let orch = orchestrator(&gateway, recognizer, config());
    let cancel = CancellationToken::new();

    let (record, same_zone) = orch
        .handle_turn(awaiting_command(Some("hot")), "move the box", &cancel)
        .await
        .unwrap();
    assert_eq!(same_zone.texts(), vec![messages::CANNOT_DO, FOLLOW_UP]);

    let (_, no_destination) = orch.handle_turn(record, "move it", &cancel).await.unwrap();
    assert_eq!(no_destination.texts(), vec![messages::CANNOT_DO, FOLLOW_UP]);
    assert!(move_calls(&gateway).is_empty());
}

#[tokio::test]
async fn movement_without_pending_request_emits_nothing() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let orch = orchestrator(&gateway, scripted([]), config());
    let cancel = CancellationToken::new();
    let mut turn = Turn::new(Duration::from_secs(1), &cancel);
    let mut task = TaskState::default();

    let status = orch
        .check_object_position(&mut task, Movement::new("box", "cold"), 0, &mut turn)
        .await
        .unwrap();

    assert_eq!(status, MovementStatus::Ended(MovementOutcome::Abandoned));
    assert!(turn.messages.is_empty());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn hung_gateway_hits_the_deadline() {
    let gateway = Arc::new(MockGateway::with_local_robot(7).with_latency(Duration::from_millis(500)));
    let config = DialogConfig {
        call_timeout_ms: 20,
        ..config()
    };
    let orch = orchestrator(&gateway, scripted([]), config);

    let (record, out) = orch
        .begin(ConversationRecord::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out.texts(), vec![messages::NO_ROBOTS]);
    assert_eq!(record.step, DialogStep::Idle);
}

#[tokio::test]
async fn cancelled_conversation_aborts_the_turn() {
    let gateway = Arc::new(MockGateway::with_local_robot(7));
    let orch = orchestrator(&gateway, scripted([]), config());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = orch
        .begin(ConversationRecord::default(), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, DialogError::Cancelled));
}

#[test]
fn invalid_config_is_rejected() {
    let gateway = Arc::new(MockGateway::new());
    let config = DialogConfig {
        greeting: " ".to_string(),
        ..DialogConfig::default()
    };
    let result = Orchestrator::new(gateway, scripted([]), config);
    assert!(matches!(result, Err(DialogError::Config(_))));
}
