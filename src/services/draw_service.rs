use crate::cache::TtlCache;
use crate::config::Config;
use crate::database::ConnectionPool;
use crate::debounce::DebounceGuard;
use crate::entities::{
    draw_record_entity as records, participant_entity as participants,
    session_entity as session,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    DrawFailure, ParticipantResponse, RegisterResponse, SessionState, SessionStatusResponse,
    StartSessionResponse, Winner,
};
use crate::utils::{generate_lucky_number, generate_session_id};
use chrono::Utc;
use rand::seq::SliceRandom;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const PARTICIPANTS_KEY: &str = "participants";
const STATUS_KEY: &str = "session:status";
const WINNERS_PREFIX: &str = "session:winners:";
/// Matches every session-derived key (status and winners)
const SESSION_KEYS: &str = "session:";

/// Values kept in the shared response cache
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Participants(Vec<ParticipantResponse>),
    Status(SessionState),
    Winners(Vec<Winner>),
}

pub type ResponseCache = TtlCache<CachedValue>;

/// Tunables of the draw engine, usually derived from [`Config`]
#[derive(Debug, Clone)]
pub struct DrawSettings {
    pub lucky_numbers: RangeInclusive<i32>,
    pub max_number_attempts: u32,
    pub status_ttl: Duration,
    pub winners_ttl: Duration,
    pub participants_ttl: Duration,
    pub register_debounce: Duration,
    pub session_debounce: Duration,
    pub draw_debounce: Duration,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            lucky_numbers: 1000..=9999,
            max_number_attempts: 100,
            status_ttl: Duration::from_secs(30),
            winners_ttl: Duration::from_secs(60),
            participants_ttl: Duration::from_secs(60),
            register_debounce: Duration::from_millis(2000),
            session_debounce: Duration::from_millis(1000),
            draw_debounce: Duration::from_millis(1000),
        }
    }
}

impl From<&Config> for DrawSettings {
    fn from(config: &Config) -> Self {
        Self {
            lucky_numbers: config.raffle.lucky_number_min..=config.raffle.lucky_number_max,
            max_number_attempts: config.raffle.max_number_attempts,
            status_ttl: Duration::from_secs(config.cache.status_ttl_secs),
            winners_ttl: Duration::from_secs(config.cache.winners_ttl_secs),
            participants_ttl: Duration::from_secs(config.cache.participants_ttl_secs),
            register_debounce: Duration::from_millis(config.debounce.register_ms),
            session_debounce: Duration::from_millis(config.debounce.session_ms),
            draw_debounce: Duration::from_millis(config.debounce.draw_ms),
        }
    }
}

/// Registration, session lifecycle and draws.
///
/// Every operation goes debounce guard -> pooled connection -> storage -> cache.
/// Session-changing operations (start, draw, end) are serialised by
/// `session_lock`, so two admins cannot assign the same position twice.
#[derive(Clone)]
pub struct DrawService {
    pool: ConnectionPool,
    cache: Arc<ResponseCache>,
    debounce: Arc<DebounceGuard>,
    settings: DrawSettings,
    session_lock: Arc<Mutex<()>>,
}

impl DrawService {
    pub fn new(
        pool: ConnectionPool,
        cache: Arc<ResponseCache>,
        debounce: Arc<DebounceGuard>,
        settings: DrawSettings,
    ) -> Self {
        Self {
            pool,
            cache,
            debounce,
            settings,
            session_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Register a participant and hand out an unused lucky number.
    pub async fn register(&self, name: &str, email: &str) -> AppResult<RegisterResponse> {
        let name = name.trim();
        let email = email.trim().to_lowercase();

        if name.is_empty() || email.is_empty() {
            return Err(AppError::ValidationError(
                "Please fill in all fields!".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(AppError::ValidationError("Invalid email!".to_string()));
        }

        if !self
            .debounce
            .try_act(&format!("register:{email}"), self.settings.register_debounce)
        {
            log::debug!("Registration for {email} debounced");
            return Err(AppError::Debounced);
        }

        let conn = self.pool.acquire().await?;

        if participants::Entity::find()
            .filter(participants::Column::Email.eq(&email))
            .one(&*conn)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateEmail);
        }

        // a concurrent registration may take the same number between the
        // lookup and the insert; the unique index catches it and we retry
        let mut attempts = 0;
        let participant = loop {
            attempts += 1;
            let lucky_number = self.pick_free_lucky_number(&*conn).await?;
            match insert_participant(&*conn, name, &email, lucky_number).await {
                Ok(participant) => break participant,
                Err(err) => match registration_conflict(&err) {
                    Some(RegistrationConflict::Email) => return Err(AppError::DuplicateEmail),
                    Some(RegistrationConflict::LuckyNumber)
                        if attempts < self.settings.max_number_attempts =>
                    {
                        log::debug!("Lucky number {lucky_number:04} taken concurrently, retrying");
                    }
                    Some(RegistrationConflict::LuckyNumber) => {
                        return Err(AppError::NumberExhaustion);
                    }
                    None => return Err(err.into()),
                },
            }
        };

        self.cache.invalidate(Some(PARTICIPANTS_KEY));
        log::info!(
            "Registered participant #{} with lucky number {:04}",
            participant.id,
            participant.lucky_number
        );

        Ok(participant.into())
    }

    /// All participants ordered by name.
    pub async fn list_participants(&self) -> AppResult<Vec<ParticipantResponse>> {
        if let Some(CachedValue::Participants(list)) =
            self.cache.get(PARTICIPANTS_KEY, self.settings.participants_ttl)
        {
            return Ok(list);
        }

        let conn = self.pool.acquire().await?;
        let list: Vec<ParticipantResponse> = participants::Entity::find()
            .order_by_asc(participants::Column::Name)
            .order_by_asc(participants::Column::Id)
            .all(&*conn)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        self.cache
            .set(PARTICIPANTS_KEY, CachedValue::Participants(list.clone()));
        Ok(list)
    }

    /// Session status for display; may be up to `status_ttl` old.
    pub async fn session_status(&self) -> AppResult<SessionStatusResponse> {
        let state = self.cached_state().await?;
        Ok(SessionStatusResponse::from(&state))
    }

    /// Session status read straight from storage.
    pub async fn session_status_fresh(&self) -> AppResult<SessionStatusResponse> {
        let state = self.fresh_state().await?;
        Ok(SessionStatusResponse::from(&state))
    }

    /// Start a new session. A running session is left untouched and reported
    /// back with `started = false`.
    pub async fn start_session(&self) -> AppResult<StartSessionResponse> {
        if !self
            .debounce
            .try_act("session:start", self.settings.session_debounce)
        {
            log::debug!("Session start debounced");
            return Err(AppError::Debounced);
        }

        let _guard = self.session_lock.lock().await;
        let conn = self.pool.acquire().await?;
        let state = load_state(&*conn).await?;

        let session_id = generate_session_id();
        let Some(started) = state.start(session_id.clone(), Utc::now()) else {
            let running = state.session_id().unwrap_or_default().to_string();
            log::info!("Session {running} already active, start ignored");
            return Ok(StartSessionResponse {
                session_id: running,
                started: false,
            });
        };

        started.to_active_model().update(&*conn).await?;
        self.cache.invalidate(Some(SESSION_KEYS));
        log::info!("Session {session_id} started");

        Ok(StartSessionResponse {
            session_id,
            started: true,
        })
    }

    /// Draw the next winner of the active session.
    ///
    /// The record insert and the draw-count increment share one transaction.
    pub async fn draw(&self) -> AppResult<Winner> {
        if !self
            .debounce
            .try_act("session:draw", self.settings.draw_debounce)
        {
            log::debug!("Draw debounced");
            return Err(AppError::Debounced);
        }

        let _guard = self.session_lock.lock().await;
        let conn = self.pool.acquire().await?;
        let txn = conn.begin().await?;

        let state = load_state(&txn).await?;
        let position = state.next_position().map_err(refuse_draw)?;
        let session_id = state
            .session_id()
            .map(str::to_string)
            .ok_or_else(|| refuse_draw(DrawFailure::NoActiveSession))?;

        let already_drawn: Vec<i32> = records::Entity::find()
            .select_only()
            .column(records::Column::LuckyNumber)
            .filter(records::Column::SessionId.eq(&session_id))
            .into_tuple()
            .all(&txn)
            .await?;

        let eligible = participants::Entity::find()
            .filter(participants::Column::LuckyNumber.is_not_in(already_drawn))
            .all(&txn)
            .await?;

        let chosen = {
            let mut rng = rand::thread_rng();
            eligible.choose(&mut rng).cloned()
        };
        let participant =
            chosen.ok_or_else(|| refuse_draw(DrawFailure::NoEligibleParticipant))?;

        let record = records::ActiveModel {
            session_id: Set(session_id.clone()),
            participant_id: Set(participant.id),
            lucky_number: Set(participant.lucky_number),
            position: Set(position),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // guarded on the count we read, so the row cannot drift from the records
        let bumped = session::Entity::update_many()
            .col_expr(
                session::Column::DrawCount,
                Expr::col(session::Column::DrawCount).add(1),
            )
            .filter(session::Column::Id.eq(session::SESSION_ROW_ID))
            .filter(session::Column::Active.eq(true))
            .filter(session::Column::DrawCount.eq(position - 1))
            .exec(&txn)
            .await?;
        if bumped.rows_affected != 1 {
            return Err(AppError::InternalError(
                "session changed while drawing".to_string(),
            ));
        }

        txn.commit().await?;
        self.cache.invalidate(Some(SESSION_KEYS));

        let winner = Winner::new(&record, &participant);
        log::info!(
            "Session {session_id}: position {} goes to participant #{} ({:04})",
            winner.position,
            winner.participant_id,
            winner.lucky_number
        );
        Ok(winner)
    }

    /// End the active session and return its winners by position.
    /// Without an active session this returns an empty list.
    pub async fn end_session(&self) -> AppResult<Vec<Winner>> {
        if !self
            .debounce
            .try_act("session:end", self.settings.session_debounce)
        {
            log::debug!("Session end debounced");
            return Err(AppError::Debounced);
        }

        let _guard = self.session_lock.lock().await;
        let conn = self.pool.acquire().await?;
        let txn = conn.begin().await?;

        let state = load_state(&txn).await?;
        let Some(ended) = state.end(Utc::now()) else {
            return Ok(Vec::new());
        };
        let session_id = ended.session_id().unwrap_or_default().to_string();

        let winners = winners_for(&txn, &session_id).await?;
        ended.to_active_model().update(&txn).await?;
        txn.commit().await?;

        // everything cached before the boundary is stale now
        self.cache.invalidate(None);
        log::info!(
            "Session {session_id} ended with {} winner(s)",
            winners.len()
        );

        Ok(winners)
    }

    /// Winners of the active session, or of the last one once it has ended.
    pub async fn current_winners(&self) -> AppResult<Vec<Winner>> {
        let state = self.cached_state().await?;
        let Some(session_id) = state.session_id() else {
            return Ok(Vec::new());
        };

        let key = format!("{WINNERS_PREFIX}{session_id}");
        if let Some(CachedValue::Winners(winners)) = self.cache.get(&key, self.settings.winners_ttl)
        {
            return Ok(winners);
        }

        let conn = self.pool.acquire().await?;
        let winners = winners_for(&*conn, session_id).await?;
        self.cache.set(key, CachedValue::Winners(winners.clone()));
        Ok(winners)
    }

    // -----------------------------
    // helpers
    // -----------------------------

    async fn cached_state(&self) -> AppResult<SessionState> {
        if let Some(CachedValue::Status(state)) = self.cache.get(STATUS_KEY, self.settings.status_ttl)
        {
            return Ok(state);
        }
        self.fresh_state().await
    }

    async fn fresh_state(&self) -> AppResult<SessionState> {
        let conn = self.pool.acquire().await?;
        let state = load_state(&*conn).await?;
        self.cache.set(STATUS_KEY, CachedValue::Status(state.clone()));
        Ok(state)
    }

    async fn pick_free_lucky_number<C: ConnectionTrait>(&self, conn: &C) -> AppResult<i32> {
        for _ in 0..self.settings.max_number_attempts {
            let candidate = generate_lucky_number(&self.settings.lucky_numbers);
            let taken = participants::Entity::find()
                .filter(participants::Column::LuckyNumber.eq(candidate))
                .count(conn)
                .await?;
            if taken == 0 {
                return Ok(candidate);
            }
        }
        log::warn!(
            "No free lucky number found after {} attempts",
            self.settings.max_number_attempts
        );
        Err(AppError::NumberExhaustion)
    }
}

async fn load_state<C: ConnectionTrait>(conn: &C) -> AppResult<SessionState> {
    session::Entity::find_by_id(session::SESSION_ROW_ID)
        .one(conn)
        .await?
        .map(SessionState::from)
        .ok_or_else(|| AppError::InternalError("session row missing, run migrations".to_string()))
}

async fn winners_for<C: ConnectionTrait>(conn: &C, session_id: &str) -> AppResult<Vec<Winner>> {
    let rows = records::Entity::find()
        .find_also_related(participants::Entity)
        .filter(records::Column::SessionId.eq(session_id))
        .order_by_asc(records::Column::Position)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(record, participant)| participant.map(|p| Winner::new(&record, &p)))
        .collect())
}

fn refuse_draw(reason: DrawFailure) -> AppError {
    log::info!("Draw refused: {reason}");
    AppError::DrawUnavailable(reason)
}

async fn insert_participant<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    email: &str,
    lucky_number: i32,
) -> Result<participants::Model, DbErr> {
    participants::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        lucky_number: Set(lucky_number),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Which unique index an insert ran into, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegistrationConflict {
    Email,
    LuckyNumber,
}

/// A concurrent registration can slip past the existence checks; the unique
/// indexes still catch it.
fn registration_conflict(err: &DbErr) -> Option<RegistrationConflict> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email") => {
            Some(RegistrationConflict::Email)
        }
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("lucky_number") => {
            Some(RegistrationConflict::LuckyNumber)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::database::run_migrations;
    use tempfile::TempDir;

    fn quiet_settings() -> DrawSettings {
        DrawSettings {
            register_debounce: Duration::ZERO,
            session_debounce: Duration::ZERO,
            draw_debounce: Duration::ZERO,
            ..DrawSettings::default()
        }
    }

    async fn setup(settings: DrawSettings) -> (TempDir, DrawService) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raffle.db");
        let pool = ConnectionPool::new(DatabaseConfig::new(format!(
            "sqlite://{}?mode=rwc",
            path.display()
        )));
        {
            let conn = pool.acquire().await.unwrap();
            run_migrations(&conn).await.unwrap();
        }
        let service = DrawService::new(
            pool,
            Arc::new(ResponseCache::new()),
            Arc::new(DebounceGuard::new()),
            settings,
        );
        (dir, service)
    }

    async fn record_count(service: &DrawService, session_id: &str) -> u64 {
        let conn = service.pool.acquire().await.unwrap();
        records::Entity::find()
            .filter(records::Column::SessionId.eq(session_id))
            .count(&*conn)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_normalizes_and_rejects_duplicate_email() {
        let (_dir, service) = setup(quiet_settings()).await;

        let first = service.register("  Ana  ", "  Ana@X.com ").await.unwrap();
        assert_eq!(first.name, "Ana");
        assert_eq!(first.email, "ana@x.com");
        assert!((1000..=9999).contains(&first.lucky_number));

        let again = service.register("Ana", "ANA@x.COM").await;
        assert!(matches!(again, Err(AppError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_lucky_numbers_are_unique() {
        let (_dir, service) = setup(DrawSettings {
            lucky_numbers: 1000..=1019,
            max_number_attempts: 10_000,
            ..quiet_settings()
        })
        .await;

        let mut numbers = Vec::new();
        for i in 0..20 {
            let registered = service
                .register(&format!("P{i}"), &format!("p{i}@x.com"))
                .await
                .unwrap();
            numbers.push(registered.lucky_number);
        }
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), 20);
        assert!(numbers.iter().all(|n| (1000..=1019).contains(n)));
    }

    #[tokio::test]
    async fn test_insert_conflicts_are_classified() {
        let (_dir, service) = setup(quiet_settings()).await;
        let conn = service.pool.acquire().await.unwrap();
        insert_participant(&*conn, "Ana", "ana@x.com", 1234)
            .await
            .unwrap();

        let same_number = insert_participant(&*conn, "Bia", "bia@x.com", 1234)
            .await
            .unwrap_err();
        assert_eq!(
            registration_conflict(&same_number),
            Some(RegistrationConflict::LuckyNumber)
        );

        let same_email = insert_participant(&*conn, "Ana", "ana@x.com", 4321)
            .await
            .unwrap_err();
        assert_eq!(
            registration_conflict(&same_email),
            Some(RegistrationConflict::Email)
        );
    }

    #[tokio::test]
    async fn test_concurrent_registrations_share_a_tiny_range() {
        let (_dir, service) = setup(DrawSettings {
            lucky_numbers: 1000..=1001,
            max_number_attempts: 1_000,
            ..quiet_settings()
        })
        .await;

        let (a, b) = tokio::join!(
            service.register("Ana", "ana@x.com"),
            service.register("Bia", "bia@x.com"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.lucky_number, b.lucky_number);
        assert_eq!(service.list_participants().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_number_exhaustion() {
        let (_dir, service) = setup(DrawSettings {
            lucky_numbers: 1000..=1000,
            ..quiet_settings()
        })
        .await;

        service.register("One", "one@x.com").await.unwrap();
        let second = service.register("Two", "two@x.com").await;
        assert!(matches!(second, Err(AppError::NumberExhaustion)));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (_dir, service) = setup(quiet_settings()).await;
        assert!(matches!(
            service.register("   ", "a@x.com").await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            service.register("Ana", "not-an-email").await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_repeated_registration_is_debounced_before_duplicate_check() {
        let (_dir, service) = setup(DrawSettings {
            register_debounce: Duration::from_secs(60),
            ..quiet_settings()
        })
        .await;

        service.register("Ana", "ana@x.com").await.unwrap();
        let second = service.register("Ana", " ANA@x.com").await;
        assert!(matches!(second, Err(AppError::Debounced)));

        // a different email is not affected
        service.register("Bia", "bia@x.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_participant_list_is_cached_and_invalidated() {
        let (_dir, service) = setup(quiet_settings()).await;
        service.register("Carla", "carla@x.com").await.unwrap();

        let first = service.list_participants().await.unwrap();
        let second = service.list_participants().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);

        service.register("Ana", "ana@x.com").await.unwrap();
        let names: Vec<String> = service
            .list_participants()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Ana".to_string(), "Carla".to_string()]);
    }

    #[tokio::test]
    async fn test_start_session_then_status() {
        let (_dir, service) = setup(quiet_settings()).await;

        let initial = service.session_status().await.unwrap();
        assert!(!initial.active);
        assert_eq!(initial.session_id, None);

        let started = service.start_session().await.unwrap();
        assert!(started.started);

        let status = service.session_status_fresh().await.unwrap();
        assert!(status.active);
        assert_eq!(status.draw_count, 0);
        assert_eq!(status.session_id.as_deref(), Some(started.session_id.as_str()));

        // cached status was invalidated by the start
        assert!(service.session_status().await.unwrap().active);

        // starting again keeps the running session
        let again = service.start_session().await.unwrap();
        assert!(!again.started);
        assert_eq!(again.session_id, started.session_id);
    }

    #[tokio::test]
    async fn test_draw_without_session_fails() {
        let (_dir, service) = setup(quiet_settings()).await;
        service.register("Ana", "ana@x.com").await.unwrap();

        let result = service.draw().await;
        assert!(matches!(
            result,
            Err(AppError::DrawUnavailable(DrawFailure::NoActiveSession))
        ));
    }

    #[tokio::test]
    async fn test_single_participant_scenario() {
        let (_dir, service) = setup(quiet_settings()).await;

        let ana = service.register("Ana", "ana@x.com").await.unwrap();
        assert!(matches!(
            service.register("Ana", "ana@x.com").await,
            Err(AppError::DuplicateEmail)
        ));

        let started = service.start_session().await.unwrap();
        let winner = service.draw().await.unwrap();
        assert_eq!(winner.position, 1);
        assert_eq!(winner.name, "Ana");
        assert_eq!(winner.lucky_number, ana.lucky_number);

        assert!(matches!(
            service.draw().await,
            Err(AppError::DrawUnavailable(DrawFailure::NoEligibleParticipant))
        ));
        // the failed draw rolled back and left the count alone
        assert_eq!(service.session_status_fresh().await.unwrap().draw_count, 1);
        assert_eq!(record_count(&service, &started.session_id).await, 1);

        let winners = service.end_session().await.unwrap();
        assert_eq!(
            winners,
            vec![Winner {
                position: 1,
                participant_id: ana.participant_id,
                name: "Ana".to_string(),
                lucky_number: ana.lucky_number,
            }]
        );
        assert!(!service.session_status_fresh().await.unwrap().active);
    }

    #[tokio::test]
    async fn test_three_draw_ceiling_and_no_repeats() {
        let (_dir, service) = setup(quiet_settings()).await;
        for i in 0..6 {
            service
                .register(&format!("P{i}"), &format!("p{i}@x.com"))
                .await
                .unwrap();
        }

        let session_id = service.start_session().await.unwrap().session_id;
        let mut drawn = Vec::new();
        for expected in 1..=3 {
            let winner = service.draw().await.unwrap();
            assert_eq!(winner.position, expected);
            assert!(!drawn.contains(&winner.lucky_number));
            drawn.push(winner.lucky_number);
        }

        assert!(matches!(
            service.draw().await,
            Err(AppError::DrawUnavailable(DrawFailure::DrawLimitReached))
        ));

        let status = service.session_status_fresh().await.unwrap();
        assert_eq!(status.draw_count, 3);
        assert_eq!(record_count(&service, &session_id).await, 3);

        let winners = service.end_session().await.unwrap();
        let positions: Vec<i32> = winners.iter().map(|w| w.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(winners.len() as i32, status.draw_count);
        let numbers: Vec<i32> = winners.iter().map(|w| w.lucky_number).collect();
        assert_eq!(numbers, drawn);
    }

    #[tokio::test]
    async fn test_new_session_may_draw_previous_winners() {
        let (_dir, service) = setup(quiet_settings()).await;
        let ana = service.register("Ana", "ana@x.com").await.unwrap();

        service.start_session().await.unwrap();
        service.draw().await.unwrap();
        service.end_session().await.unwrap();

        service.start_session().await.unwrap();
        let winner = service.draw().await.unwrap();
        assert_eq!(winner.lucky_number, ana.lucky_number);
        assert_eq!(winner.position, 1);
    }

    #[tokio::test]
    async fn test_current_winners_survive_session_end() {
        let (_dir, service) = setup(quiet_settings()).await;
        service.register("Ana", "ana@x.com").await.unwrap();
        service.register("Bia", "bia@x.com").await.unwrap();

        assert!(service.current_winners().await.unwrap().is_empty());

        service.start_session().await.unwrap();
        let first = service.draw().await.unwrap();
        assert_eq!(service.current_winners().await.unwrap(), vec![first.clone()]);

        let second = service.draw().await.unwrap();
        assert_eq!(
            service.current_winners().await.unwrap(),
            vec![first.clone(), second.clone()]
        );

        let ended = service.end_session().await.unwrap();
        assert_eq!(service.current_winners().await.unwrap(), ended);
    }

    #[tokio::test]
    async fn test_end_without_session_is_noop() {
        let (_dir, service) = setup(quiet_settings()).await;
        assert!(service.end_session().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_draws_respect_ceiling() {
        let (_dir, service) = setup(quiet_settings()).await;
        for i in 0..5 {
            service
                .register(&format!("P{i}"), &format!("p{i}@x.com"))
                .await
                .unwrap();
        }
        let session_id = service.start_session().await.unwrap().session_id;

        let (a, b, c, d, e) = tokio::join!(
            service.draw(),
            service.draw(),
            service.draw(),
            service.draw(),
            service.draw()
        );
        let ok = [a, b, c, d, e].into_iter().filter(Result::is_ok).count();
        assert_eq!(ok, 3);
        assert_eq!(record_count(&service, &session_id).await, 3);
    }

    #[tokio::test]
    async fn test_session_actions_are_debounced() {
        let (_dir, service) = setup(DrawSettings {
            session_debounce: Duration::from_secs(60),
            draw_debounce: Duration::from_secs(60),
            ..quiet_settings()
        })
        .await;
        service.register("Ana", "ana@x.com").await.unwrap();
        service.register("Bia", "bia@x.com").await.unwrap();

        service.start_session().await.unwrap();
        assert!(matches!(
            service.start_session().await,
            Err(AppError::Debounced)
        ));

        service.draw().await.unwrap();
        assert!(matches!(service.draw().await, Err(AppError::Debounced)));
        assert_eq!(service.session_status_fresh().await.unwrap().draw_count, 1);
    }
}
