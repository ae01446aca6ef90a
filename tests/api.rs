//! Router-level tests for the HTTP surface

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot`

use clipforge::domain::clips::InMemoryClipStore;
use clipforge::domain::settings::MemorySettingsStore;
use clipforge::domain::videos::InMemoryVideoStore;
use clipforge::services::automation::{AutomationDeps, AutomationEngine, SystemClock};
use clipforge::services::pipeline::ClipPipeline;
use clipforge::services::platforms::{PlatformRegistry, SimulatedPoster};
use clipforge::services::transcript::SampleTranscriptSource;
use clipforge::{AppState, build_app};

async fn setup_app() -> Router {
    let clips = Arc::new(InMemoryClipStore::new());
    let platforms = PlatformRegistry::new()
        .with(Arc::new(
            SimulatedPoster::new("TikTok", 1.0).with_latency(Duration::ZERO, Duration::ZERO),
        ))
        .with(Arc::new(
            SimulatedPoster::new("Twitter", 1.0).with_latency(Duration::ZERO, Duration::ZERO),
        ));

    let automation = AutomationEngine::open(AutomationDeps {
        clips: clips.clone(),
        platforms,
        settings_store: Arc::new(MemorySettingsStore::new()),
        clock: Arc::new(SystemClock),
        tick_every: Duration::from_secs(3600),
        ledger_retention: 100,
    })
    .await
    .expect("open automation engine");

    build_app(Arc::new(AppState {
        pipeline: ClipPipeline::with_seed(7),
        clips,
        videos: Arc::new(InMemoryVideoStore::new()),
        transcripts: Arc::new(SampleTranscriptSource),
        automation,
    }))
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn process_sample(app: &Router, video_id: &str) -> Value {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/process-video",
            Some(json!({
                "videoUrl": "https://videos.example.com/ai-talk.mp4",
                "videoId": video_id,
                "userId": "user_1",
                "title": "AI Talk"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn health_is_ok() {
    let app = setup_app().await;
    let (status, body) = send(&app, request("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn process_video_returns_ranked_clips() {
    let app = setup_app().await;
    let body = process_sample(&app, "video_1").await;

    assert_eq!(body["success"], true);
    assert_eq!(body["videoId"], "video_1");
    assert!(
        body["transcript"]
            .as_str()
            .unwrap()
            .starts_with("Welcome everyone to today's discussion")
    );
    assert!(body["processingTime"].is_u64());

    let clips = body["clips"].as_array().unwrap();
    assert!(!clips.is_empty() && clips.len() <= 5);
    assert_eq!(body["totalClips"], clips.len());

    let scores: Vec<f64> = clips
        .iter()
        .map(|c| c["viralityScore"].as_f64().unwrap())
        .collect();
    assert!(scores.iter().all(|s| *s >= 7.0));
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    for clip in clips {
        assert_eq!(clip["status"], "generated");
        assert_eq!(clip["postedPlatforms"], json!([]));
        let tags = clip["hashtags"].as_array().unwrap();
        assert_eq!(tags.len(), 7);
        assert_eq!(&tags[..4], &[json!("#AI"), json!("#Technology"), json!("#Future"), json!("#Innovation")]);
    }

    let (status, stored) = send(&app, request("GET", "/clips?videoId=video_1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored.as_array().unwrap().len(), clips.len());

    let (_, other) = send(&app, request("GET", "/clips?videoId=video_2", None)).await;
    assert_eq!(other, json!([]));
}

#[tokio::test]
async fn process_video_without_source_is_500() {
    let app = setup_app().await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/process-video",
            Some(json!({ "videoUrl": "", "videoId": "v", "userId": "u" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No video source provided");
}

#[tokio::test]
async fn process_video_with_malformed_body_is_500() {
    let app = setup_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/process-video")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn processed_video_is_recorded_with_its_run() {
    let app = setup_app().await;
    let processed = process_sample(&app, "video_1").await;

    let (status, videos) = send(&app, request("GET", "/videos", None)).await;
    assert_eq!(status, StatusCode::OK);
    let videos = videos.as_array().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["id"], "video_1");
    assert_eq!(videos[0]["title"], "AI Talk");
    assert_eq!(videos[0]["status"], "completed");

    let (status, detail) = send(&app, request("GET", "/videos/video_1", None)).await;
    assert_eq!(status, StatusCode::OK);
    let runs = detail["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["status"], "completed");
    assert_eq!(runs[0]["transcript"], processed["transcript"]);
    assert_eq!(runs[0]["clipCount"], processed["totalClips"]);
    assert!(runs[0].get("errorMessage").is_none());

    let (_, stats) = send(&app, request("GET", "/clips/stats", None)).await;
    assert_eq!(stats["totalVideos"], 1);
    assert_eq!(stats["totalClips"], processed["totalClips"]);

    let (_, mine) = send(&app, request("GET", "/videos?userId=user_1", None)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (_, theirs) = send(&app, request("GET", "/videos?userId=user_2", None)).await;
    assert_eq!(theirs, json!([]));

    let (status, activity) = send(&app, request("GET", "/activity?limit=50", None)).await;
    assert_eq!(status, StatusCode::OK);
    let activity = activity.as_array().unwrap();
    assert!(activity.iter().any(|item| item["kind"] == "video"
        && item["title"] == "Video \"AI Talk\" uploaded"));
    let generated = activity.iter().filter(|item| item["kind"] == "clip").count();
    assert_eq!(json!(generated), processed["totalClips"]);
}

#[tokio::test]
async fn failed_processing_is_recorded_on_the_video() {
    let app = setup_app().await;
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/process-video",
            Some(json!({ "videoUrl": "", "videoId": "v", "userId": "u", "title": "Empty" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, detail) = send(&app, request("GET", "/videos/v", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "failed");
    let runs = detail["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["status"], "failed");
    assert_eq!(runs[0]["errorMessage"], "No video source provided");
    assert!(runs[0].get("transcript").is_none());

    let (_, stats) = send(&app, request("GET", "/clips/stats", None)).await;
    assert_eq!(stats["totalVideos"], 1);
    assert_eq!(stats["totalClips"], 0);
}

#[tokio::test]
async fn unreadable_request_records_no_video() {
    let app = setup_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/process-video")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, videos) = send(&app, request("GET", "/videos", None)).await;
    assert_eq!(videos, json!([]));
    let (status, _) = send(&app, request("GET", "/videos/missing", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn process_video_method_handling() {
    let app = setup_app().await;

    let (status, _) = send(&app, request("GET", "/process-video", None)).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/process-video")
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(preflight).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn settings_update_round_trips_and_validates() {
    let app = setup_app().await;

    let (status, defaults) = send(&app, request("GET", "/automation/settings", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(defaults["enabled"], false);
    assert_eq!(defaults["postingHours"]["start"], "09:00");

    let (status, updated) = send(
        &app,
        request(
            "PUT",
            "/automation/settings",
            Some(json!({ "maxPostsPerDay": 3, "platforms": ["TikTok"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["maxPostsPerDay"], 3);
    assert_eq!(updated["postingInterval"], 60);

    let (status, _) = send(
        &app,
        request(
            "PUT",
            "/automation/settings",
            Some(json!({ "postingHours": { "start": "late", "end": "21:00" } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, current) = send(&app, request("GET", "/automation/settings", None)).await;
    assert_eq!(current["maxPostsPerDay"], 3);
    assert_eq!(current["postingHours"]["start"], "09:00");
}

#[tokio::test]
async fn manual_post_updates_clip_and_ledger() {
    let app = setup_app().await;
    let body = process_sample(&app, "video_1").await;
    let clip_id = body["clips"][0]["id"].as_str().unwrap().to_string();

    let (status, posted) = send(
        &app,
        request(
            "POST",
            &format!("/clips/{clip_id}/post"),
            Some(json!({ "platforms": ["TikTok", "Twitter"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(posted["success"], true);
    assert_eq!(posted["job"]["status"], "posted");
    assert_eq!(posted["job"]["attempts"], 1);
    assert_eq!(posted["job"]["origin"], "manual");

    let (_, clip) = send(&app, request("GET", &format!("/clips/{clip_id}"), None)).await;
    assert_eq!(clip["status"], "posted");
    assert_eq!(clip["postedPlatforms"], json!(["TikTok", "Twitter"]));

    let (_, jobs) = send(&app, request("GET", "/automation/jobs?limit=5", None)).await;
    assert_eq!(jobs.as_array().unwrap().len(), 1);
    assert_eq!(jobs[0]["clipId"], clip_id.as_str());

    let (_, stats) = send(&app, request("GET", "/automation/stats", None)).await;
    assert_eq!(stats["postsToday"], 1);
    assert_eq!(stats["successRate"], 100);
    assert_eq!(stats["nextPostTime"], "Paused");
    assert_eq!(stats["isActive"], false);

    let (_, clip_stats) = send(&app, request("GET", "/clips/stats", None)).await;
    assert_eq!(clip_stats["postsPublished"], 2);
}

#[tokio::test]
async fn manual_post_to_unknown_platform_fails_the_job() {
    let app = setup_app().await;
    let body = process_sample(&app, "video_1").await;
    let clip_id = body["clips"][0]["id"].as_str().unwrap().to_string();

    let (status, result) = send(
        &app,
        request(
            "POST",
            &format!("/clips/{clip_id}/post"),
            Some(json!({ "platforms": ["TikTok", "MySpace"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["success"], false);
    assert_eq!(result["job"]["status"], "failed");

    let (_, clip) = send(&app, request("GET", &format!("/clips/{clip_id}"), None)).await;
    assert_eq!(clip["status"], "generated");
    assert_eq!(clip["postedPlatforms"], json!([]));
}

#[tokio::test]
async fn unknown_clip_is_404() {
    let app = setup_app().await;

    let (status, _) = send(&app, request("GET", "/clips/clip_missing", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request("PATCH", "/clips/clip_missing", Some(json!({ "title": "New" }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request("POST", "/clips/clip_missing/post", Some(json!({ "platforms": ["TikTok"] }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, jobs) = send(&app, request("GET", "/automation/jobs", None)).await;
    assert_eq!(jobs, json!([]));
}

#[tokio::test]
async fn clip_edit_keeps_score() {
    let app = setup_app().await;
    let body = process_sample(&app, "video_1").await;
    let clip = &body["clips"][0];
    let clip_id = clip["id"].as_str().unwrap();

    let (status, edited) = send(
        &app,
        request(
            "PATCH",
            &format!("/clips/{clip_id}"),
            Some(json!({ "title": "My own title", "hashtags": ["#Mine"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["title"], "My own title");
    assert_eq!(edited["hashtags"], json!(["#Mine"]));
    assert_eq!(edited["caption"], clip["caption"]);
    assert_eq!(edited["viralityScore"], clip["viralityScore"]);
}

#[tokio::test]
async fn platform_connection_test() {
    let app = setup_app().await;

    let (_, platforms) = send(&app, request("GET", "/automation/platforms", None)).await;
    assert_eq!(platforms, json!(["TikTok", "Twitter"]));

    let (status, ok) = send(&app, request("POST", "/automation/platforms/TikTok/test", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ok["connected"], true);

    let (_, unknown) = send(&app, request("POST", "/automation/platforms/MySpace/test", None)).await;
    assert_eq!(unknown["connected"], false);
}
