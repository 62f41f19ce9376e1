//! Router-level tests for the API using in-memory port fakes.

use api_lib::{
    config::Config,
    web::{router, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use postcraft_core::{
    domain::{GeneratedPrompt, NewPrompt, Post, PostStatus, Profile, Prompt, Role},
    ports::{DatabaseService, PortError, PortResult, PromptGenerationService},
    schedule::ScheduleDate,
    TtlProfileCache,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

const USER_SESSION: &str = "user-session";
const ADMIN_SESSION: &str = "admin-session";

//=========================================================================================
// Fakes
//=========================================================================================

struct FakeDb {
    user_id: Uuid,
    admin_id: Uuid,
    prompts: Mutex<Vec<Prompt>>,
    posts: Vec<Post>,
    fail_posts: bool,
    profile_lookups: AtomicUsize,
}

impl FakeDb {
    fn new(prompts: Vec<Prompt>, posts: Vec<Post>) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            admin_id: Uuid::new_v4(),
            prompts: Mutex::new(prompts),
            posts,
            fail_posts: false,
            profile_lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DatabaseService for FakeDb {
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        match session_id {
            USER_SESSION => Ok(self.user_id),
            ADMIN_SESSION => Ok(self.admin_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Profile> {
        self.profile_lookups.fetch_add(1, Ordering::SeqCst);
        let role = if user_id == self.admin_id {
            Role::Admin
        } else {
            Role::User
        };
        Ok(Profile {
            user_id,
            email: None,
            role,
            onboarding_completed: true,
            subscription_status: Some("active".to_string()),
        })
    }

    async fn get_prompts_for_user(&self, _user_id: Uuid) -> PortResult<Vec<Prompt>> {
        Ok(self.prompts.lock().unwrap().clone())
    }

    async fn get_posts_for_user(&self, _user_id: Uuid) -> PortResult<Vec<Post>> {
        if self.fail_posts {
            return Err(PortError::Unexpected("connection reset".to_string()));
        }
        Ok(self.posts.clone())
    }

    async fn insert_prompts(
        &self,
        _user_id: Uuid,
        prompts: Vec<NewPrompt>,
    ) -> PortResult<Vec<Prompt>> {
        let inserted: Vec<Prompt> = prompts
            .into_iter()
            .map(|new| Prompt {
                id: Uuid::new_v4(),
                category: new.prompt.category,
                hook: new.prompt.hook,
                prompt_text: new.prompt.prompt_text,
                is_used: false,
                scheduled_date: Some(new.scheduled_date),
                pushed_to_calendar: true,
                pillar_number: new.prompt.pillar_number,
            })
            .collect();
        self.prompts.lock().unwrap().extend(inserted.clone());
        Ok(inserted)
    }

    async fn reschedule_prompt(
        &self,
        _user_id: Uuid,
        prompt_id: Uuid,
        date: ScheduleDate,
    ) -> PortResult<Prompt> {
        let mut prompts = self.prompts.lock().unwrap();
        let prompt = prompts
            .iter_mut()
            .find(|p| p.id == prompt_id)
            .ok_or_else(|| PortError::NotFound(format!("Prompt {} not found", prompt_id)))?;
        prompt.scheduled_date = Some(date);
        Ok(prompt.clone())
    }

    async fn mark_prompt_used(&self, _user_id: Uuid, prompt_id: Uuid) -> PortResult<Prompt> {
        let mut prompts = self.prompts.lock().unwrap();
        let prompt = prompts
            .iter_mut()
            .find(|p| p.id == prompt_id)
            .ok_or_else(|| PortError::NotFound(format!("Prompt {} not found", prompt_id)))?;
        prompt.is_used = true;
        Ok(prompt.clone())
    }
}

struct FakeLlm;

#[async_trait]
impl PromptGenerationService for FakeLlm {
    async fn generate_prompts(
        &self,
        count: usize,
        pillar_hint: Option<i32>,
    ) -> PortResult<Vec<GeneratedPrompt>> {
        Ok((0..count)
            .map(|i| GeneratedPrompt {
                category: "story".to_string(),
                hook: format!("Hook {}", i),
                prompt_text: format!("Prompt {}", i),
                pillar_number: pillar_hint,
            })
            .collect())
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn app(db: Arc<FakeDb>, with_llm: bool) -> Router {
    let config = Config::from_lookup(|key| {
        (key == "DATABASE_URL").then(|| "postgres://localhost/unused".to_string())
    })
    .unwrap();
    let prompt_adapter: Option<Arc<dyn PromptGenerationService>> = if with_llm {
        Some(Arc::new(FakeLlm))
    } else {
        None
    };
    router(Arc::new(AppState {
        db,
        config: Arc::new(config),
        prompt_adapter,
        profile_cache: Arc::new(TtlProfileCache::new(Duration::from_secs(60))),
    }))
}

fn prompt_on(date: &str, is_used: bool) -> Prompt {
    Prompt {
        id: Uuid::new_v4(),
        category: "lesson".to_string(),
        hook: "Hook".to_string(),
        prompt_text: "Share a lesson".to_string(),
        is_used,
        scheduled_date: Some(date.parse().unwrap()),
        pushed_to_calendar: true,
        pillar_number: Some(1),
    }
}

fn used_post_at(at: &str) -> Post {
    Post {
        id: Uuid::new_v4(),
        title: "Shipped".to_string(),
        content: "We shipped".to_string(),
        status: PostStatus::Used,
        content_type: "text".to_string(),
        posted_at: Some(DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc)),
        created_at: Utc::now(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(session) = session {
        builder = builder.header(header::COOKIE, format!("session={}", session));
    }
    builder.body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, session: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(session) = session {
        builder = builder.header(header::COOKIE, format!("session={}", session));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

//=========================================================================================
// Schedule Endpoints
//=========================================================================================

#[tokio::test]
async fn schedule_endpoint_returns_mwf_run() {
    let db = Arc::new(FakeDb::new(vec![], vec![]));
    let (status, body) = send(
        app(db, false),
        get("/schedule?count=6&start=2024-01-15", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "dates": [
            "2024-01-15", "2024-01-17", "2024-01-19",
            "2024-01-22", "2024-01-24", "2024-01-26"
        ]})
    );
}

#[tokio::test]
async fn schedule_endpoint_rejects_bad_counts() {
    let db = Arc::new(FakeDb::new(vec![], vec![]));
    for uri in [
        "/schedule?count=2.5",
        "/schedule?count=-1",
        "/schedule?count=100000",
        "/schedule?count=3&start=2024-02-30",
    ] {
        let (status, _) = send(app(db.clone(), false), get(uri, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn next_date_and_validation_endpoints() {
    let db = Arc::new(FakeDb::new(vec![], vec![]));
    let (status, body) = send(
        app(db.clone(), false),
        get("/schedule/next?from=2024-01-20", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "date": "2024-01-22", "display": "Mon, Jan 22" }));

    let (_, body) = send(
        app(db.clone(), false),
        with_json("POST", "/schedule/validate", None, json!({ "date": "2024-02-30" })),
    )
    .await;
    assert_eq!(body["valid"], json!(false));
    assert!(body["reason"].is_string());

    let (_, body) = send(
        app(db.clone(), false),
        with_json("POST", "/schedule/validate", None, json!({ "date": "2024-01-17" })),
    )
    .await;
    assert_eq!(body, json!({ "valid": true }));

    let (_, body) = send(
        app(db, false),
        with_json("POST", "/schedule/validate", None, json!({ "date": " 2024-01-17 " })),
    )
    .await;
    assert_eq!(body["valid"], json!(false));
    assert!(body["reason"].as_str().unwrap().contains("YYYY-MM-DD"));
}

//=========================================================================================
// Calendar and Dashboard
//=========================================================================================

#[tokio::test]
async fn calendar_requires_a_session() {
    let db = Arc::new(FakeDb::new(vec![], vec![]));
    let (status, _) = send(app(db.clone(), false), get("/calendar", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(app(db, false), get("/calendar", Some("forged"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn calendar_merges_posts_and_prompts_with_labels() {
    let db = Arc::new(FakeDb::new(
        vec![prompt_on("2024-01-15", false), prompt_on("2024-01-17", true)],
        vec![used_post_at("2024-01-15T10:00:00Z")],
    ));
    let (status, body) = send(
        app(db, false),
        get("/calendar?utcOffsetMinutes=0", Some(USER_SESSION)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], json!("2024-01-15"));
    assert_eq!(days[0]["hasCompletedPost"], json!(true));
    assert_eq!(days[0]["hasAvailablePrompt"], json!(true));
    assert_eq!(days[0]["display"], json!("Mon, Jan 15"));
    assert_eq!(days[0]["dayName"], json!("Monday"));
    assert_eq!(days[1]["hasAvailablePrompt"], json!(false));
    assert_eq!(days[1]["posts"], json!([]));
}

#[tokio::test]
async fn calendar_range_and_failed_post_fetch_degrade_gracefully() {
    let mut fake = FakeDb::new(
        vec![prompt_on("2024-01-15", false), prompt_on("2024-02-02", false)],
        vec![used_post_at("2024-01-15T10:00:00Z")],
    );
    fake.fail_posts = true;
    let db = Arc::new(fake);

    let (status, body) = send(
        app(db, false),
        get(
            "/calendar?from=2024-01-01&to=2024-01-31&utcOffsetMinutes=0",
            Some(USER_SESSION),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["hasCompletedPost"], json!(false));
    assert_eq!(days[0]["prompts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn profile_is_cached_between_requests() {
    let db = Arc::new(FakeDb::new(vec![], vec![]));
    let app = app(db.clone(), false);
    for _ in 0..3 {
        let (status, body) = send(
            app.clone(),
            get("/dashboard/stats?utcOffsetMinutes=0", Some(USER_SESSION)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalPosts"], json!(0));
    }
    assert_eq!(db.profile_lookups.load(Ordering::SeqCst), 1);
}

//=========================================================================================
// Prompt Mutations
//=========================================================================================

#[tokio::test]
async fn reschedule_rejects_non_mwf_dates_and_persists_valid_ones() {
    let prompt = prompt_on("2024-01-15", false);
    let id = prompt.id;
    let db = Arc::new(FakeDb::new(vec![prompt], vec![]));
    let uri = format!("/prompts/{}/schedule", id);

    let (status, body) = send(
        app(db.clone(), false),
        with_json("PATCH", &uri, Some(USER_SESSION), json!({ "scheduledDate": "2024-01-16" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.as_str().unwrap().contains("Tuesday"));

    let (status, _) = send(
        app(db.clone(), false),
        with_json("PATCH", &uri, Some(USER_SESSION), json!({ "scheduledDate": " 2024-01-19" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        app(db.clone(), false),
        with_json("PATCH", &uri, Some(USER_SESSION), json!({ "scheduledDate": "2024-01-19" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scheduledDate"], json!("2024-01-19"));
    assert_eq!(
        db.prompts.lock().unwrap()[0].scheduled_date.map(|d| d.key()),
        Some("2024-01-19".to_string())
    );

    let missing = format!("/prompts/{}/use", Uuid::new_v4());
    let (status, _) = send(
        app(db, false),
        with_json("POST", &missing, Some(USER_SESSION), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generation_is_admin_only_and_stamps_schedule_dates() {
    let db = Arc::new(FakeDb::new(vec![], vec![]));
    let target = db.user_id;
    let request = json!({
        "userId": target,
        "count": 3,
        "startDate": "2024-01-14",
        "pillarNumber": 2
    });

    let (status, _) = send(
        app(db.clone(), true),
        with_json("POST", "/admin/prompts/generate", Some(USER_SESSION), request.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        app(db.clone(), false),
        with_json("POST", "/admin/prompts/generate", Some(ADMIN_SESSION), request.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = send(
        app(db.clone(), true),
        with_json("POST", "/admin/prompts/generate", Some(ADMIN_SESSION), request),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let dates: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["scheduledDate"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-15", "2024-01-17", "2024-01-19"]);
    assert_eq!(db.prompts.lock().unwrap().len(), 3);
}
