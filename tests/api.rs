//! HTTP-level tests driving the full router against the in-memory store.

use std::{collections::HashMap, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use lucky_envelopes_back::{
    config::AppConfig,
    dao::game_store::memory::InMemoryGameStore,
    routes,
    state::{AppState, SharedState},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn create_test_app() -> (Router, SharedState) {
    let state = AppState::with_game_store(
        AppConfig::default(),
        Arc::new(InMemoryGameStore::new()),
    );
    (routes::router(state.clone()), state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Six envelopes with three tries, returning the prize of each envelope id.
async fn seed_game(app: &Router) -> HashMap<String, String> {
    let (status, _) = post(
        app,
        "/api/game-config",
        json!({"envelopeCount": 6, "maxTries": 3, "timerSeconds": 60}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let envelopes: Vec<Value> = (1..=6)
        .map(|position| json!({"position": position, "prizeText": format!("Gift {position}"), "color": "mint"}))
        .collect();
    let (status, created) = post(app, "/api/envelopes/bulk", Value::Array(envelopes)).await;
    assert_eq!(status, StatusCode::OK);

    created
        .as_array()
        .unwrap()
        .iter()
        .map(|envelope| {
            (
                envelope["id"].as_str().unwrap().to_owned(),
                envelope["prizeText"].as_str().unwrap().to_owned(),
            )
        })
        .collect()
}

fn shuffled_order(game_state: &Value) -> Vec<String> {
    game_state["shuffledOrder"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap().to_owned())
        .collect()
}

mod catalogue {
    use super::*;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let (app, _) = create_test_app();
        let (status, body) = get(&app, "/healthcheck").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn default_config_is_returned_when_unset() {
        let (app, _) = create_test_app();
        let (status, body) = get(&app, "/api/game-config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"envelopeCount": 6, "maxTries": 3, "timerSeconds": 60})
        );
    }

    #[tokio::test]
    async fn saving_config_validates_ranges() {
        let (app, _) = create_test_app();

        let (status, body) = post(
            &app,
            "/api/game-config",
            json!({"envelopeCount": 20, "maxTries": 3}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid request data");
        assert!(body["errors"]["envelope_count"].is_array());

        let (status, body) = post(
            &app,
            "/api/game-config",
            json!({"envelopeCount": 8, "maxTries": 4}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timerSeconds"], 60);

        let (_, body) = get(&app, "/api/game-config").await;
        assert_eq!(body["maxTries"], 4);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (app, _) = create_test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/game-config")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn no_envelopes_lists_as_empty_array() {
        let (app, _) = create_test_app();
        let (status, body) = get(&app, "/api/envelopes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn bulk_replacement_fills_defaults_and_orders_by_position() {
        let (app, _) = create_test_app();
        post(
            &app,
            "/api/envelopes",
            json!({"position": 1, "prizeText": "Old", "color": "sky"}),
        )
        .await;

        let (status, body) = post(
            &app,
            "/api/envelopes/bulk",
            json!([
                {"position": 2, "prizeText": "Kayak tour"},
                {"position": 1, "prizeText": "  ", "color": "sage"}
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["position"], 1);
        assert_eq!(body[0]["prizeText"], "Prize 1");
        assert_eq!(body[0]["color"], "sage");
        assert_eq!(body[1]["color"], "mint");

        let (_, listed) = get(&app, "/api/envelopes").await;
        assert_eq!(listed, body);
    }

    #[tokio::test]
    async fn bulk_replacement_rejects_duplicate_positions() {
        let (app, _) = create_test_app();
        let (status, body) = post(
            &app,
            "/api/envelopes/bulk",
            json!([{"position": 1}, {"position": 1}]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["position"].is_array());
    }

    #[tokio::test]
    async fn creating_an_envelope_on_a_taken_position_fails() {
        let (app, _) = create_test_app();
        let payload = json!({"position": 2, "prizeText": "Picnic"});
        let (status, _) = post(&app, "/api/envelopes", payload.clone()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post(&app, "/api/envelopes", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn prize_suggestions_respect_count() {
        let (app, _) = create_test_app();

        let (status, body) = get(&app, "/api/prize-suggestions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 6);

        let (_, body) = get(&app, "/api/prize-suggestions?count=3").await;
        let suggestions = body.as_array().unwrap();
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0]["color"], "coral");
        assert!(suggestions[2]["prizeText"].is_string());

        let (status, _) = get(&app, "/api/prize-suggestions?count=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod game_flow {
    use super::*;

    #[tokio::test]
    async fn game_state_is_created_on_first_read() {
        let (app, _) = create_test_app();
        let (status, body) = get(&app, "/api/game-state").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["gameStarted"], false);
        assert_eq!(body["remainingTries"], 3);
        assert_eq!(body["revision"], 1);
        assert!(body["finalPrize"].is_null());

        let (_, again) = get(&app, "/api/game-state").await;
        assert_eq!(again["revision"], 1);
    }

    #[tokio::test]
    async fn three_tries_complete_with_the_first_unopened_prize() {
        let (app, _) = create_test_app();
        let prizes = seed_game(&app).await;

        let (status, started) = post(&app, "/api/game-state/start", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let order = shuffled_order(&started);
        assert_eq!(order.len(), 6);
        let mut sorted = order.clone();
        sorted.sort();
        let mut ids: Vec<_> = prizes.keys().cloned().collect();
        ids.sort();
        assert_eq!(sorted, ids);

        for (index, id) in order.iter().take(3).enumerate() {
            let (status, body) = post(
                &app,
                "/api/game-state/select-envelope",
                json!({"envelopeId": id}),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["remainingTries"], 2 - index as u64);
        }

        let (_, state) = get(&app, "/api/game-state").await;
        assert_eq!(state["isGameComplete"], true);
        assert_eq!(state["cashedOut"], false);
        assert_eq!(state["finalPrize"], prizes[&order[3]].as_str());

        let (status, body) = post(
            &app,
            "/api/game-state/select-envelope",
            json!({"envelopeId": order[4]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No tries remaining");

        let (_, board) = get(&app, "/api/game-state/board").await;
        let board = board.as_array().unwrap();
        assert_eq!(board.len(), 6);
        assert!(board.iter().all(|slot| slot["prizeText"].is_string()));
        assert_eq!(board.iter().filter(|slot| slot["opened"] == true).count(), 3);
    }

    #[tokio::test]
    async fn cash_out_banks_the_selected_prize() {
        let (app, _) = create_test_app();
        let prizes = seed_game(&app).await;
        let (_, started) = post(&app, "/api/game-state/start", json!({})).await;
        let first = shuffled_order(&started)[0].clone();

        post(
            &app,
            "/api/game-state/select-envelope",
            json!({"envelopeId": first}),
        )
        .await;
        let (status, body) = post(
            &app,
            "/api/game-state/cash-out",
            json!({"envelopeId": first}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isGameComplete"], true);
        assert_eq!(body["cashedOut"], true);
        assert_eq!(body["finalPrize"], prizes[&first].as_str());
        assert_eq!(body["selectedEnvelopes"], json!([first]));
        assert_eq!(body["remainingTries"], 2);
    }

    #[tokio::test]
    async fn invalid_selections_are_rejected_without_changing_state() {
        let (app, _) = create_test_app();
        seed_game(&app).await;

        let (status, _) = post(
            &app,
            "/api/game-state/select-envelope",
            json!({"envelopeId": "anything"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, started) = post(&app, "/api/game-state/start", json!({})).await;
        let revision = started["revision"].clone();
        let first = shuffled_order(&started)[0].clone();

        let (status, body) = post(&app, "/api/game-state/select-envelope", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Envelope ID is required");

        let (status, _) = post(
            &app,
            "/api/game-state/select-envelope",
            json!({"envelopeId": "missing"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, state) = get(&app, "/api/game-state").await;
        assert_eq!(state["revision"], revision);

        post(
            &app,
            "/api/game-state/select-envelope",
            json!({"envelopeId": first}),
        )
        .await;
        let (status, body) = post(
            &app,
            "/api/game-state/select-envelope",
            json!({"envelopeId": first}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Envelope already selected");
    }

    #[tokio::test]
    async fn cash_out_without_a_game_is_rejected() {
        let (app, _) = create_test_app();
        seed_game(&app).await;

        let (status, body) = post(
            &app,
            "/api/game-state/cash-out",
            json!({"envelopeId": "whatever"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No active game state");
    }

    #[tokio::test]
    async fn catalogue_is_locked_while_a_game_runs() {
        let (app, _) = create_test_app();
        let prizes = seed_game(&app).await;
        let (_, started) = post(&app, "/api/game-state/start", json!({})).await;
        let order = shuffled_order(&started);

        let replacement: Vec<Value> = (1..=6)
            .map(|position| json!({"position": position, "prizeText": format!("New {position}")}))
            .collect();
        let (status, body) = post(&app, "/api/envelopes/bulk", Value::Array(replacement)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Envelopes cannot change while a game is in progress"
        );

        let (status, _) = post(
            &app,
            "/api/envelopes",
            json!({"position": 7, "prizeText": "Late addition"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, listed) = get(&app, "/api/envelopes").await;
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 6);
        assert!(listed.iter().all(|e| prizes.contains_key(e["id"].as_str().unwrap())));

        let mut last = Value::Null;
        for id in order.iter().take(3) {
            let (status, body) = post(
                &app,
                "/api/game-state/select-envelope",
                json!({"envelopeId": id}),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            last = body;
        }
        assert_eq!(last["isGameComplete"], true);
        assert_eq!(last["finalPrize"], prizes[&order[3]].as_str());
    }

    #[tokio::test]
    async fn replacing_the_catalogue_resets_a_finished_game() {
        let (app, state) = create_test_app();
        seed_game(&app).await;
        post(&app, "/api/game-state/start", json!({})).await;
        let (_, finished) = post(&app, "/api/game-state/time-up", json!({})).await;
        assert_eq!(finished["isGameComplete"], true);

        let mut events = state.events().subscribe();
        let (status, created) = post(
            &app,
            "/api/envelopes/bulk",
            json!([{"position": 1, "prizeText": "Sunrise hike"}]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created.as_array().unwrap().len(), 1);

        let event = events.recv().await.unwrap();
        assert_eq!(event.event, "game_state");

        let (_, current) = get(&app, "/api/game-state").await;
        assert_eq!(current["gameStarted"], false);
        assert_eq!(current["isGameComplete"], false);
        assert_eq!(current["shuffledOrder"], json!([]));
        assert_eq!(current["finalPrize"], Value::Null);
        assert_eq!(current["remainingTries"], 3);
    }

    #[tokio::test]
    async fn cash_out_is_accepted_after_completion_and_after_reset() {
        let (app, _) = create_test_app();
        let prizes = seed_game(&app).await;
        let (_, started) = post(&app, "/api/game-state/start", json!({})).await;
        let order = shuffled_order(&started);
        for id in order.iter().take(3) {
            post(
                &app,
                "/api/game-state/select-envelope",
                json!({"envelopeId": id}),
            )
            .await;
        }

        let (status, body) = post(
            &app,
            "/api/game-state/cash-out",
            json!({"envelopeId": order[0]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cashedOut"], true);
        assert_eq!(body["finalPrize"], prizes[&order[0]].as_str());
        assert_eq!(body["remainingTries"], 0);

        post(&app, "/api/game-state/reset", json!({})).await;
        let (status, body) = post(
            &app,
            "/api/game-state/cash-out",
            json!({"envelopeId": order[1]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isGameComplete"], true);
        assert_eq!(body["cashedOut"], true);
        assert_eq!(body["finalPrize"], prizes[&order[1]].as_str());
    }

    #[tokio::test]
    async fn time_up_reveals_the_last_selection() {
        let (app, _) = create_test_app();
        let prizes = seed_game(&app).await;
        let (_, started) = post(&app, "/api/game-state/start", json!({})).await;
        let order = shuffled_order(&started);

        post(
            &app,
            "/api/game-state/select-envelope",
            json!({"envelopeId": order[2]}),
        )
        .await;
        let (status, body) = post(&app, "/api/game-state/time-up", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isGameComplete"], true);
        assert_eq!(body["cashedOut"], false);
        assert_eq!(body["finalPrize"], prizes[&order[2]].as_str());

        let (status, again) = post(&app, "/api/game-state/time-up", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["finalPrize"], prizes[&order[2]].as_str());
    }

    #[tokio::test]
    async fn reset_restores_the_configured_tries() {
        let (app, _) = create_test_app();
        seed_game(&app).await;
        let (_, started) = post(&app, "/api/game-state/start", json!({})).await;
        let first = shuffled_order(&started)[0].clone();
        post(
            &app,
            "/api/game-state/select-envelope",
            json!({"envelopeId": first}),
        )
        .await;

        let (status, body) = post(&app, "/api/game-state/reset", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["gameStarted"], false);
        assert_eq!(body["isGameComplete"], false);
        assert_eq!(body["remainingTries"], 3);
        assert_eq!(body["selectedEnvelopes"], json!([]));
        assert_eq!(body["shuffledOrder"], json!([]));
    }

    #[tokio::test]
    async fn transitions_are_broadcast_as_game_state_events() {
        let (app, state) = create_test_app();
        seed_game(&app).await;
        let mut events = state.events().subscribe();

        post(&app, "/api/game-state/start", json!({})).await;

        let event = events.recv().await.unwrap();
        assert_eq!(event.event, "game_state");
        let payload: Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(payload["gameStarted"], true);
    }
}

mod degraded {
    use super::*;

    #[tokio::test]
    async fn requests_fail_with_503_without_storage() {
        let state = AppState::new(AppConfig::default());
        let app = routes::router(state);

        let (status, body) = get(&app, "/api/game-state").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["message"].is_string());

        let (_, health) = get(&app, "/healthcheck").await;
        assert_eq!(health["status"], "degraded");

        let (status, _) = get(&app, "/api/prize-suggestions?count=2").await;
        assert_eq!(status, StatusCode::OK);
    }
}
