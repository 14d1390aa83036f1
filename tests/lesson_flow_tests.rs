// tests/lesson_flow_tests.rs

use std::collections::HashMap;

use lingvista::{config::Config, routes, state::AppState};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

async fn spawn_app() -> (String, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "lesson_flow_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

async fn register_and_login(address: &str, client: &reqwest::Client, username: &str) -> String {
    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({"username": username, "password": "password123"}))
        .send()
        .await
        .expect("Register failed");

    let login_resp = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({"username": username, "password": "password123"}))
        .send()
        .await
        .expect("Login failed")
        .json::<serde_json::Value>()
        .await
        .unwrap();

    login_resp["token"].as_str().unwrap().to_string()
}

async fn seed_lesson(pool: &SqlitePool, level: &str, number: i64, title: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO lessons (level, lesson_number, title) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(level)
    .bind(number)
    .bind(title)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_choice_task(
    pool: &SqlitePool,
    lesson_id: i64,
    question: &str,
    options: (&str, &str, &str),
    correct_index: i64,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO tasks (lesson_id, question, correct_answer, option1, option2, option3)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(lesson_id)
    .bind(question)
    .bind(correct_index.to_string())
    .bind(options.0)
    .bind(options.1)
    .bind(options.2)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_audio_task(
    pool: &SqlitePool,
    lesson_id: i64,
    question: &str,
    transcript: &str,
) -> i64 {
    let audio_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO audio (file_url) VALUES ('/media/clip.mp3') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO tasks (lesson_id, question, correct_answer, audio_id)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(lesson_id)
    .bind(question)
    .bind(transcript)
    .bind(audio_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn full_lesson_and_progression_flow() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let token = register_and_login(&address, &client, &username).await;

    // A1 has one lesson with four tasks; A2 has a lesson so the unlock
    // chain stops there.
    let lesson_id = seed_lesson(&pool, "A1", 1, "Basics").await;
    let t1 = seed_choice_task(&pool, lesson_id, "Pick cat", ("cat", "dog", "bird"), 1).await;
    let t2 = seed_choice_task(&pool, lesson_id, "Pick dog", ("cat", "dog", "bird"), 2).await;
    let t3 = seed_choice_task(&pool, lesson_id, "Pick bird", ("cat", "dog", "bird"), 3).await;
    let t4 = seed_audio_task(&pool, lesson_id, "Type what you hear", "The cat sat.").await;
    seed_lesson(&pool, "A2", 1, "Next steps").await;

    // 1. Initially only A1 is unlocked, nothing completed
    let levels: Vec<serde_json::Value> = client
        .get(format!("{}/api/levels", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(levels.len(), 6);
    let a1 = levels.iter().find(|l| l["level"] == "A1").unwrap();
    let a2 = levels.iter().find(|l| l["level"] == "A2").unwrap();
    assert_eq!(a1["is_unlocked"], true);
    assert_eq!(a1["is_completed"], false);
    assert_eq!(a2["is_unlocked"], false);

    // 2. Task DTOs expose the channel but never the correct answer
    let tasks: Vec<serde_json::Value> = client
        .get(format!("{}/api/levels/A1/lessons/1", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[0]["channel"], "task");
    assert_eq!(tasks[3]["channel"], "audio_answer");
    assert_eq!(tasks[3]["audio_url"], "/media/clip.mp3");
    assert!(tasks[0].get("correct_answer").is_none());

    // 3. Submit 3 of 4 correct: 75%, passing, A2 unlock notice fires
    let first_try: HashMap<i64, &str> = HashMap::from([
        (t1, "cat"),
        (t2, "dog"),
        (t3, "cat"),
        (t4, "  the Cat   SAT."),
    ]);
    let submit_resp = client
        .post(format!("{}/api/levels/A1/lessons/1", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "answers": first_try }))
        .send()
        .await
        .unwrap();
    assert_eq!(submit_resp.status().as_u16(), 200);
    let result: serde_json::Value = submit_resp.json().await.unwrap();
    assert_eq!(result["score"], 75);
    assert_eq!(result["correct_count"], 3);
    assert_eq!(result["passed"], true);
    assert_eq!(
        result["message"],
        "Congratulations! Level A2 is open to you!"
    );
    let verdicts = result["tasks"].as_array().unwrap();
    assert_eq!(verdicts.len(), 4);
    assert_eq!(verdicts[2]["is_correct"], false);
    assert_eq!(verdicts[3]["is_correct"], true);

    // 4. Lessons page shows the stored score, not yet completed
    let lessons: Vec<serde_json::Value> = client
        .get(format!("{}/api/levels/A1/lessons", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(lessons[0]["score"], 75);
    assert_eq!(lessons[0]["is_completed"], false);

    // 5. A2 is now unlocked, B1 still locked behind A2's lesson
    let levels: Vec<serde_json::Value> = client
        .get(format!("{}/api/levels", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let a2 = levels.iter().find(|l| l["level"] == "A2").unwrap();
    let b1 = levels.iter().find(|l| l["level"] == "B1").unwrap();
    assert_eq!(a2["is_unlocked"], true);
    assert_eq!(b1["is_unlocked"], false);

    // 6. Resubmission replaces the stored result in place
    let second_try: HashMap<i64, &str> = HashMap::from([
        (t1, "cat"),
        (t2, "dog"),
        (t3, "bird"),
        (t4, "the cat sat."),
    ]);
    let resubmit: serde_json::Value = client
        .post(format!("{}/api/levels/A1/lessons/1", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "answers": second_try }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resubmit["score"], 100);
    assert_eq!(resubmit["correct_count"], 4);

    let rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_tasks_progress WHERE level = 'A1'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(rows, 1);

    // 7. A perfect lesson refuses to reopen or rescore
    let reopen = client
        .get(format!("{}/api/levels/A1/lessons/1", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(reopen.status().as_u16(), 409);

    let rescore = client
        .post(format!("{}/api/levels/A1/lessons/1", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"answers": {}}))
        .send()
        .await
        .unwrap();
    assert_eq!(rescore.status().as_u16(), 409);

    let stored: i64 = sqlx::query_scalar(
        "SELECT result FROM user_tasks_progress WHERE level = 'A1' AND lesson = 1",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(stored, 100);

    // 8. A1 is now completed; the account page agrees
    let levels: Vec<serde_json::Value> = client
        .get(format!("{}/api/levels", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let a1 = levels.iter().find(|l| l["level"] == "A1").unwrap();
    assert_eq!(a1["is_completed"], true);

    let me: serde_json::Value = client
        .get(format!("{}/api/profile/me", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["username"], username);
    assert_eq!(me["language_level"], "A2");
    assert_eq!(
        me["unlocked_levels"],
        serde_json::json!(["A1", "A2"])
    );
    assert_eq!(me["progress"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_level_and_lesson_are_not_found() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client, "wanderer").await;
    seed_lesson(&pool, "A1", 1, "Basics").await;

    let bad_level = client
        .get(format!("{}/api/levels/Z9/lessons", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_level.status().as_u16(), 404);

    let bad_lesson = client
        .get(format!("{}/api/levels/A1/lessons/99", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_lesson.status().as_u16(), 404);
}

#[tokio::test]
async fn malformed_task_surfaces_as_server_error() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client, "victim").await;

    let lesson_id = seed_lesson(&pool, "A1", 1, "Broken").await;
    // Answer index points past the populated options
    let task_id =
        seed_choice_task(&pool, lesson_id, "Pick", ("cat", "dog", "bird"), 5).await;

    let answers: HashMap<i64, &str> = HashMap::from([(task_id, "cat")]);
    let response = client
        .post(format!("{}/api/levels/A1/lessons/1", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "answers": answers }))
        .send()
        .await
        .unwrap();

    // Bad authoring is a server-side error, never a silent zero
    assert_eq!(response.status().as_u16(), 500);
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_tasks_progress")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn lowercase_level_codes_are_accepted() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client, "lowercase").await;

    let lesson_id = seed_lesson(&pool, "A1", 1, "Basics").await;
    let task_id = seed_choice_task(&pool, lesson_id, "Pick", ("cat", "dog", "bird"), 1).await;

    let answers: HashMap<i64, &str> = HashMap::from([(task_id, "cat")]);
    let result: serde_json::Value = client
        .post(format!("{}/api/levels/a1/lessons/1", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "answers": answers }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(result["score"], 100);

    let stored_level: String =
        sqlx::query_scalar("SELECT level FROM user_tasks_progress LIMIT 1")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(stored_level, "A1");
}
