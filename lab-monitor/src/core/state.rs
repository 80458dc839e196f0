use parking_lot::Mutex;
use serde::Serialize;
use shared::models::{Equipment, Notification};
use std::sync::Arc;

use crate::core::{Config, LoungeError, LoungeResult};
use crate::lounge::commands::{normalize_player_name, validate_duration, validate_name};
use crate::lounge::{EquipmentRegistry, LoungeCommand, LoungeCounters, SessionEngine, TickReport};
use crate::notify::{
    AudibleAlert, BroadcastSink, FanoutSink, LogSink, NotificationSink, Notifier, SilentAlert,
    TerminalBell, player_line,
};
use crate::storage::{EQUIPMENT_KEY, LocalStore, PEOPLE_INSIDE_KEY, TOTAL_ENTRIES_KEY};

/// Aggregate figures shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoungeStats {
    pub people_inside: u32,
    pub total_entries: u64,
    pub equipment_in_use: usize,
    pub total_equipment: usize,
}

/// What a successfully dispatched command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    EquipmentAdded(Equipment),
    SessionStarted(Equipment),
    SessionEnded(Equipment),
    EquipmentDeleted(Equipment),
    EntryRecorded(LoungeStats),
    ExitRecorded(LoungeStats),
    /// Unknown equipment id or nothing to do
    Ignored,
}

/// Mutable lounge data, only ever touched under the state mutex
#[derive(Debug, Default)]
struct Lounge {
    registry: EquipmentRegistry,
    counters: LoungeCounters,
}

impl Lounge {
    fn stats(&self) -> LoungeStats {
        LoungeStats {
            people_inside: self.counters.people_inside,
            total_entries: self.counters.total_entries,
            equipment_in_use: self.registry.occupied_count(),
            total_equipment: self.registry.len(),
        }
    }
}

/// 应用状态 - 唯一持有可变数据的协调者
///
/// 注册表和计数器只存在于这里，通过参数注入 [`SessionEngine`]，
/// 因此引擎和注册表可以独立测试。使用 Arc 实现浅拷贝。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | lounge | 注册表 + 计数器 (Mutex) |
/// | engine | 倒计时引擎 |
/// | store | redb 键值存储 |
/// | notifier | 通知 + 提示音 |
/// | broadcast | 通知广播 (控制台等订阅) |
///
/// Every mutation (operator command or tick) holds the mutex for its whole
/// duration, so commands and ticks never interleave. Notifications are
/// emitted after the lock is released.
#[derive(Clone, Debug)]
pub struct AppState {
    config: Config,
    lounge: Arc<Mutex<Lounge>>,
    engine: SessionEngine,
    store: LocalStore,
    notifier: Notifier,
    broadcast: BroadcastSink,
}

impl AppState {
    /// Open the store under the work directory and load persisted state.
    ///
    /// Notifications go to the log and to [`AppState::subscribe`] receivers.
    pub fn initialize(config: &Config) -> Self {
        if let Err(e) = std::fs::create_dir_all(&config.work_dir) {
            tracing::warn!(work_dir = %config.work_dir, error = %e, "Failed to create work directory");
        }
        let store = LocalStore::open_or_fallback(config.db_path());

        let broadcast = BroadcastSink::new();
        let sink = FanoutSink::new()
            .with(Arc::new(LogSink))
            .with(Arc::new(broadcast.clone()));
        let alert: Arc<dyn AudibleAlert> = if config.enable_sound {
            Arc::new(TerminalBell)
        } else {
            Arc::new(SilentAlert)
        };

        Self::with_parts(config.clone(), store, Arc::new(sink), alert, broadcast)
    }

    /// Build from explicit parts (tests, embedding)
    pub fn with_parts(
        config: Config,
        store: LocalStore,
        sink: Arc<dyn NotificationSink>,
        alert: Arc<dyn AudibleAlert>,
        broadcast: BroadcastSink,
    ) -> Self {
        let counters = LoungeCounters::new(
            store.read(PEOPLE_INSIDE_KEY, 0u32),
            store.read(TOTAL_ENTRIES_KEY, 0u64),
        );
        let registry = EquipmentRegistry::from_stored(store.read(EQUIPMENT_KEY, Vec::new()));
        tracing::info!(
            people_inside = counters.people_inside,
            total_entries = counters.total_entries,
            equipment = registry.len(),
            active_sessions = registry.occupied_count(),
            backend = ?store.backend(),
            "Lounge state loaded"
        );

        let notifier = Notifier::new(sink, alert, config.expiry_notice_ms);
        Self {
            engine: SessionEngine::new(config.warning_threshold_secs),
            config,
            lounge: Arc::new(Mutex::new(Lounge { registry, counters })),
            store,
            notifier,
            broadcast,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Receive every notification emitted from now on
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Notification> {
        self.broadcast.subscribe()
    }

    pub fn stats(&self) -> LoungeStats {
        self.lounge.lock().stats()
    }

    /// Equipment list in display order
    pub fn equipment(&self) -> Vec<Equipment> {
        self.lounge.lock().registry.snapshot()
    }

    /// Resolve an operator selector (index, id or name) to an equipment
    pub fn find_equipment(&self, selector: &str) -> Option<Equipment> {
        self.lounge.lock().registry.find(selector).cloned()
    }

    // ========== Commands ==========

    /// Apply one operator command.
    ///
    /// Validation rejections are reported to the operator and returned as
    /// errors; unknown equipment ids are ignored.
    pub fn dispatch(&self, command: LoungeCommand) -> LoungeResult<CommandOutcome> {
        let name = command.name();
        let result = self.apply(command);

        match &result {
            Ok(CommandOutcome::Ignored) => {
                tracing::debug!(command = name, "Command ignored");
            }
            Ok(outcome) => {
                tracing::debug!(command = name, ?outcome, "Command applied");
                self.notifier.notify(describe_outcome(outcome));
            }
            Err(e) => {
                tracing::info!(command = name, error = %e, "Command rejected");
                self.notifier.notify(describe_rejection(e));
            }
        }
        result
    }

    fn apply(&self, command: LoungeCommand) -> LoungeResult<CommandOutcome> {
        match command {
            LoungeCommand::AddEquipment { name, kind } => {
                let name = validate_name(&name)?;
                let mut lounge = self.lounge.lock();
                let equipment = lounge.registry.add(name, kind);
                self.persist_equipment(&lounge);
                Ok(CommandOutcome::EquipmentAdded(equipment))
            }
            LoungeCommand::StartSession {
                equipment_id,
                duration_minutes,
                player_name,
                mode,
            } => {
                let minutes = validate_duration(duration_minutes, self.config.max_session_minutes)?;
                let player_name = normalize_player_name(player_name);
                let mut lounge = self.lounge.lock();
                match self
                    .engine
                    .start_session(&mut lounge.registry, &equipment_id, minutes, player_name, mode)
                {
                    Ok(_) => {}
                    Err(e) if e.is_not_found() => return Ok(CommandOutcome::Ignored),
                    Err(e) => return Err(e),
                }
                self.persist_equipment(&lounge);
                Ok(lounge
                    .registry
                    .get(&equipment_id)
                    .cloned()
                    .map_or(CommandOutcome::Ignored, CommandOutcome::SessionStarted))
            }
            LoungeCommand::EndSession { equipment_id } => {
                let mut lounge = self.lounge.lock();
                if self.engine.end_session(&mut lounge.registry, &equipment_id).is_none() {
                    return Ok(CommandOutcome::Ignored);
                }
                self.persist_equipment(&lounge);
                Ok(lounge
                    .registry
                    .get(&equipment_id)
                    .cloned()
                    .map_or(CommandOutcome::Ignored, CommandOutcome::SessionEnded))
            }
            LoungeCommand::DeleteEquipment { equipment_id } => {
                let mut lounge = self.lounge.lock();
                let Some(removed) = lounge.registry.remove(&equipment_id) else {
                    return Ok(CommandOutcome::Ignored);
                };
                if let Some(session) = removed.current_session() {
                    tracing::info!(equipment_id = %removed.id, session_id = %session.id, "Running session discarded with equipment");
                }
                self.persist_equipment(&lounge);
                Ok(CommandOutcome::EquipmentDeleted(removed))
            }
            LoungeCommand::RecordEntry => {
                let mut lounge = self.lounge.lock();
                lounge.counters.record_entry();
                self.persist_counters(&lounge.counters);
                Ok(CommandOutcome::EntryRecorded(lounge.stats()))
            }
            LoungeCommand::RecordExit => {
                let mut lounge = self.lounge.lock();
                lounge.counters.record_exit()?;
                self.persist_counters(&lounge.counters);
                Ok(CommandOutcome::ExitRecorded(lounge.stats()))
            }
        }
    }

    // ========== Tick ==========

    /// Advance all sessions by one second and publish threshold events
    pub fn tick(&self) -> TickReport {
        let report = {
            let mut lounge = self.lounge.lock();
            let report = self.engine.tick(&mut lounge.registry);
            if !report.is_idle() {
                self.persist_equipment(&lounge);
            }
            report
        };

        if !report.is_idle() {
            tracing::trace!(decremented = report.decremented, events = report.events.len(), "Tick");
        }
        for event in &report.events {
            self.notifier.session_event(event);
        }
        report
    }

    // ========== Persistence ==========

    fn persist_equipment(&self, lounge: &Lounge) {
        self.store.write(EQUIPMENT_KEY, lounge.registry.as_slice());
    }

    fn persist_counters(&self, counters: &LoungeCounters) {
        self.store.write(PEOPLE_INSIDE_KEY, &counters.people_inside);
        self.store.write(TOTAL_ENTRIES_KEY, &counters.total_entries);
    }
}

fn describe_outcome(outcome: &CommandOutcome) -> Notification {
    match outcome {
        CommandOutcome::EquipmentAdded(eq) => {
            Notification::success(format!("{} added", eq.kind.label()))
                .with_description(Some(eq.name.clone()))
        }
        CommandOutcome::SessionStarted(eq) => {
            let player = eq.current_session().and_then(|s| s.player_name.as_deref());
            Notification::success(format!("Session started on {}", eq.name))
                .with_description(player_line(player))
        }
        CommandOutcome::SessionEnded(eq) => Notification::info(format!("Session ended on {}", eq.name)),
        CommandOutcome::EquipmentDeleted(eq) => {
            Notification::success("Equipment removed").with_description(Some(eq.name.clone()))
        }
        CommandOutcome::EntryRecorded(_) => Notification::success("Entry recorded!"),
        CommandOutcome::ExitRecorded(_) => Notification::success("Exit recorded!"),
        CommandOutcome::Ignored => Notification::info("Nothing to do"),
    }
}

fn describe_rejection(error: &LoungeError) -> Notification {
    match error {
        LoungeError::NoOneInside => Notification::error("No one inside to exit!"),
        LoungeError::EquipmentOccupied(name) => Notification::error(format!("{name} is already in use"))
            .with_description(Some("End the current session first or force a replacement".to_string())),
        other => Notification::error(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lounge::StartMode;
    use shared::models::{EquipmentType, NotificationKind};

    fn test_state() -> AppState {
        let broadcast = BroadcastSink::new();
        AppState::with_parts(
            Config::with_work_dir("unused"),
            LocalStore::open_in_memory().unwrap(),
            Arc::new(broadcast.clone()),
            Arc::new(SilentAlert),
            broadcast,
        )
    }

    fn add(state: &AppState, name: &str) -> Equipment {
        match state
            .dispatch(LoungeCommand::AddEquipment {
                name: name.to_string(),
                kind: EquipmentType::Pc,
            })
            .unwrap()
        {
            CommandOutcome::EquipmentAdded(eq) => eq,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    fn start(state: &AppState, id: &str, minutes: u32) -> LoungeResult<CommandOutcome> {
        state.dispatch(LoungeCommand::StartSession {
            equipment_id: id.to_string(),
            duration_minutes: minutes,
            player_name: None,
            mode: StartMode::Reject,
        })
    }

    #[test]
    fn test_add_equipment_validates_and_notifies() {
        let state = test_state();
        let mut rx = state.subscribe();

        let err = state
            .dispatch(LoungeCommand::AddEquipment {
                name: "   ".to_string(),
                kind: EquipmentType::Console,
            })
            .unwrap_err();
        assert!(matches!(err, LoungeError::Validation(_)));
        assert_eq!(rx.try_recv().unwrap().kind, NotificationKind::Error);
        assert_eq!(state.stats().total_equipment, 0);

        let eq = add(&state, "  PC01 ");
        assert_eq!(eq.name, "PC01");
        let n = rx.try_recv().unwrap();
        assert_eq!(n.title, "PC added");
    }

    #[test]
    fn test_start_session_rejects_bad_duration_and_occupied() {
        let state = test_state();
        let eq = add(&state, "PC01");

        assert!(matches!(start(&state, &eq.id, 0), Err(LoungeError::Validation(_))));
        assert!(matches!(start(&state, &eq.id, 241), Err(LoungeError::Validation(_))));
        assert!(matches!(start(&state, &eq.id, 30), Ok(CommandOutcome::SessionStarted(_))));
        assert_eq!(
            start(&state, &eq.id, 30),
            Err(LoungeError::EquipmentOccupied("PC01".to_string()))
        );
        assert_eq!(state.stats().equipment_in_use, 1);
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let state = test_state();
        assert_eq!(start(&state, "ghost", 30), Ok(CommandOutcome::Ignored));
        assert_eq!(
            state.dispatch(LoungeCommand::EndSession { equipment_id: "ghost".into() }),
            Ok(CommandOutcome::Ignored)
        );
        assert_eq!(
            state.dispatch(LoungeCommand::DeleteEquipment { equipment_id: "ghost".into() }),
            Ok(CommandOutcome::Ignored)
        );
    }

    #[test]
    fn test_exit_at_zero_reports_rejection() {
        let state = test_state();
        let mut rx = state.subscribe();

        assert_eq!(state.dispatch(LoungeCommand::RecordExit), Err(LoungeError::NoOneInside));
        let n = rx.try_recv().unwrap();
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.title, "No one inside to exit!");
        assert_eq!(state.stats().people_inside, 0);

        state.dispatch(LoungeCommand::RecordEntry).unwrap();
        state.dispatch(LoungeCommand::RecordEntry).unwrap();
        let outcome = state.dispatch(LoungeCommand::RecordExit).unwrap();
        match outcome {
            CommandOutcome::ExitRecorded(stats) => {
                assert_eq!(stats.people_inside, 1);
                assert_eq!(stats.total_entries, 2);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_delete_active_equipment_discards_session() {
        let state = test_state();
        let eq = add(&state, "PC01");
        start(&state, &eq.id, 10).unwrap();

        let outcome = state
            .dispatch(LoungeCommand::DeleteEquipment { equipment_id: eq.id.clone() })
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::EquipmentDeleted(ref removed) if removed.is_occupied()));
        assert_eq!(state.stats(), LoungeStats::default());
        assert_eq!(state.tick().decremented, 0);
    }

    #[test]
    fn test_state_reloads_from_store() {
        let store = LocalStore::open_in_memory().unwrap();
        let build = |store: LocalStore| {
            let broadcast = BroadcastSink::new();
            AppState::with_parts(
                Config::with_work_dir("unused"),
                store,
                Arc::new(broadcast.clone()),
                Arc::new(SilentAlert),
                broadcast,
            )
        };

        let state = build(store.clone());
        let eq = add(&state, "PC01");
        start(&state, &eq.id, 5).unwrap();
        state.tick();
        state.dispatch(LoungeCommand::RecordEntry).unwrap();
        let before = state.equipment();

        let reloaded = build(store);
        assert_eq!(reloaded.equipment(), before);
        assert_eq!(reloaded.stats().people_inside, 1);
        assert_eq!(reloaded.stats().total_entries, 1);
        assert_eq!(
            reloaded.equipment()[0].current_session().unwrap().time_remaining,
            299
        );
    }
}
