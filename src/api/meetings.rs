use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::auth::validation_messages;
use crate::api::errors::ApiError;
use crate::api::guards::{require_valid_id, require_verified, CurrentUser};
use crate::api::query::{self, MeetingDetailIntent, MeetingsListIntent};
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::db::models::Meeting;
use crate::repositories;
use crate::repositories::meetings::CreateMeeting;
use crate::schemas::meeting::{AtaCreate, AtaResponse, MeetingCreate, MeetingResponse};
use crate::schemas::DataResponse;
use crate::services::images::{store_image, validate_data_uri};
use crate::tasks::gamification::GamificationEvent;

const MAX_ATA_IMAGES: usize = 4;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(detail).patch(add_ata).delete(remove))
}

/// `GET /api/meetings?filter=past|future`, scoped to the caller's school.
async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<DataResponse<Vec<MeetingResponse>>>, ApiError> {
    require_verified(&user)?;
    let intent = query::meetings_list(&pairs).map_err(ApiError::Validation)?;

    // One pivot for the whole listing; status never mixes clock readings.
    let pivot = primitive_now_utc();
    let past = matches!(intent, MeetingsListIntent::Past);
    let meetings = repositories::meetings::list_by_school(state.db(), &user.school_id, pivot, past)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list meetings"))?
        .into_iter()
        .map(|meeting| MeetingResponse::from_db(meeting, pivot))
        .collect();

    Ok(Json(DataResponse::new(meetings)))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<MeetingCreate>,
) -> Result<(StatusCode, Json<DataResponse<MeetingResponse>>), ApiError> {
    require_verified(&user)?;
    payload.validate().map_err(validation_messages)?;

    let date = to_primitive_utc(payload.date);
    let taken = repositories::meetings::exists_at_slot(state.db(), date, &payload.room)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check meeting slot"))?;
    if taken {
        return Err(ApiError::Conflict(
            "There is already a meeting schedule for this room, day and hour.".to_string(),
        ));
    }

    let now = primitive_now_utc();
    let meeting = repositories::meetings::create(
        state.db(),
        CreateMeeting {
            id: &Uuid::new_v4().to_string(),
            school_id: &user.school_id,
            creator_id: &user.id,
            date,
            description: &payload.description,
            room: &payload.room,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create meeting"))?;

    state.gamification().dispatch(GamificationEvent::MeetingCreated { user_id: user.id });

    Ok((StatusCode::CREATED, Json(DataResponse::new(MeetingResponse::from_db(meeting, now)))))
}

/// `GET /api/meetings/:id`: plain detail, or the ata view with `fields=ata`.
async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    require_verified(&user)?;
    let intent = query::meeting_detail(&pairs).map_err(ApiError::Validation)?;
    require_valid_id(&id)?;
    let meeting = fetch_meeting(&state, &id).await?;

    match intent {
        MeetingDetailIntent::Detail => {
            let response = MeetingResponse::from_db(meeting, primitive_now_utc());
            Ok(Json(DataResponse::new(response)).into_response())
        }
        MeetingDetailIntent::Ata => {
            let Some(ata) = meeting.ata else {
                return Err(ApiError::NotFound("This meeting has no ATA yet.".to_string()));
            };
            let images = repositories::meetings::list_ata_images(state.db(), &meeting.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to list ata images"))?
                .into_iter()
                .map(|image| image.url)
                .collect();
            Ok(Json(DataResponse::new(AtaResponse { id: meeting.id, ata, images }))
                .into_response())
        }
    }
}

/// `PATCH /api/meetings/:id?fields=ata` attaches the minutes, once, to a
/// past meeting.
async fn add_ata(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    Json(payload): Json<AtaCreate>,
) -> Result<Json<DataResponse<AtaResponse>>, ApiError> {
    require_verified(&user)?;
    query::meeting_update(&pairs).map_err(ApiError::Validation)?;
    require_valid_id(&id)?;

    let ata = match payload.ata.as_deref() {
        Some(ata) if !ata.is_empty() => ata.to_string(),
        _ => return Err(ApiError::BadRequest("ata is required".to_string())),
    };
    check_ata_images(&payload.images)?;

    let now = primitive_now_utc();
    let meeting = fetch_meeting(&state, &id).await?;
    if meeting.date >= now {
        return Err(ApiError::Conflict("You can only add ATA to past meetings.".to_string()));
    }
    if meeting.ata.is_some() {
        return Err(ApiError::Conflict("ATA already added to this meeting.".to_string()));
    }

    repositories::meetings::set_ata(state.db(), &id, &ata, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to set ata"))?;

    let mut urls = Vec::with_capacity(payload.images.len());
    for (index, data_uri) in payload.images.iter().enumerate() {
        let url = store_image(state.images(), data_uri).await;
        repositories::meetings::add_ata_image(
            state.db(),
            &Uuid::new_v4().to_string(),
            &id,
            &url,
            index as i32,
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store ata image"))?;
        urls.push(url);
    }

    state.gamification().dispatch(GamificationEvent::AtaAdded { user_id: user.id });

    Ok(Json(DataResponse::new(AtaResponse { id, ata, images: urls })))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<String>>, ApiError> {
    require_verified(&user)?;
    require_valid_id(&id)?;

    let deleted = repositories::meetings::delete(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete meeting"))?;
    if !deleted {
        return Err(ApiError::NotFound("Meeting not found.".to_string()));
    }

    Ok(Json(DataResponse::new("Meeting deleted.".to_string())))
}

async fn fetch_meeting(state: &AppState, id: &str) -> Result<Meeting, ApiError> {
    repositories::meetings::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch meeting"))?
        .ok_or_else(|| ApiError::NotFound("Meeting not found.".to_string()))
}

fn check_ata_images(images: &[String]) -> Result<(), ApiError> {
    if images.is_empty() {
        return Err(ApiError::BadRequest("images are required".to_string()));
    }
    if images.len() > MAX_ATA_IMAGES {
        return Err(ApiError::BadRequest("you can only add 4 images".to_string()));
    }
    let mut errors = Vec::new();
    for image in images {
        if let Err(message) = validate_data_uri(image) {
            errors.push(message);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};
    use tower::ServiceExt;

    use crate::db::models::User;
    use crate::db::types::UserRole;
    use crate::test_support;

    const DATA_URI: &str = "data:image/png;base64,aGVsbG8=";

    fn meeting_payload(offset: Duration, room: &str) -> serde_json::Value {
        let date = (OffsetDateTime::now_utc().replace_nanosecond(0).expect("nanoseconds")
            + offset)
            .format(&Rfc3339)
            .unwrap();
        json!({
            "date": date,
            "description": "Eco council",
            "room": room,
        })
    }

    async fn setup_teacher() -> (test_support::TestContext, User, String) {
        let ctx = test_support::setup_test_context().await;
        let school = test_support::insert_school(ctx.state.db(), "Escola Verde").await;
        let teacher = test_support::insert_user(
            ctx.state.db(),
            "teacher@escola.pt",
            "Teacher",
            UserRole::Teacher,
            &school.id,
        )
        .await;
        let token = test_support::bearer_token(&teacher, ctx.state.settings());
        (ctx, teacher, token)
    }

    async fn create_meeting(
        ctx: &test_support::TestContext,
        token: &str,
        offset: Duration,
        room: &str,
    ) -> String {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/meetings",
                Some(token),
                Some(meeting_payload(offset, room)),
            ))
            .await
            .expect("create meeting");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = test_support::read_json(response).await;
        body["data"]["id"].as_str().expect("id").to_string()
    }

    #[tokio::test]
    async fn listing_requires_authentication() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/meetings?filter=past",
                None,
                None,
            ))
            .await
            .expect("request");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn listing_requires_a_filter() {
        let (ctx, _teacher, token) = setup_teacher().await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::GET, "/api/meetings", Some(&token), None))
            .await
            .expect("request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = test_support::read_json(response).await;
        assert_eq!(body["error"], json!("you must provide a query"));
    }

    #[tokio::test]
    async fn future_meetings_are_scheduled() {
        let (ctx, _teacher, token) = setup_teacher().await;
        create_meeting(&ctx, &token, Duration::days(2), "B12").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/meetings?filter=future",
                Some(&token),
                None,
            ))
            .await
            .expect("list");

        assert_eq!(response.status(), StatusCode::OK);
        let body = test_support::read_json(response).await;
        let items = body["data"].as_array().expect("array");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["status"], json!("scheduled"));
    }

    #[tokio::test]
    async fn duplicate_slot_is_a_conflict() {
        let (ctx, _teacher, token) = setup_teacher().await;
        let payload = meeting_payload(Duration::days(1), "A1");

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/meetings",
                Some(&token),
                Some(payload.clone()),
            ))
            .await
            .expect("first create");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/meetings",
                Some(&token),
                Some(payload),
            ))
            .await
            .expect("second create");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = test_support::read_json(response).await;
        assert_eq!(
            body["error"],
            json!("There is already a meeting schedule for this room, day and hour.")
        );
    }

    #[tokio::test]
    async fn ata_cannot_be_added_to_a_future_meeting() {
        let (ctx, _teacher, token) = setup_teacher().await;
        let id = create_meeting(&ctx, &token, Duration::days(1), "C3").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/meetings/{id}?fields=ata"),
                Some(&token),
                Some(json!({"ata": "Minutes", "images": [DATA_URI]})),
            ))
            .await
            .expect("request");

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = test_support::read_json(response).await;
        assert_eq!(body["error"], json!("You can only add ATA to past meetings."));
    }

    #[tokio::test]
    async fn ata_can_only_be_added_once() {
        let (ctx, _teacher, token) = setup_teacher().await;
        let id = create_meeting(&ctx, &token, -Duration::days(1), "C4").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/meetings/{id}?fields=ata"),
                Some(&token),
                Some(json!({"ata": "Minutes", "images": [DATA_URI]})),
            ))
            .await
            .expect("first ata");
        assert_eq!(response.status(), StatusCode::OK);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/meetings/{id}?fields=ata"),
                Some(&token),
                Some(json!({"ata": "Minutes again", "images": [DATA_URI]})),
            ))
            .await
            .expect("second ata");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = test_support::read_json(response).await;
        assert_eq!(body["error"], json!("ATA already added to this meeting."));
    }

    #[tokio::test]
    async fn ata_image_count_bounds() {
        let (ctx, _teacher, token) = setup_teacher().await;
        let id = create_meeting(&ctx, &token, -Duration::days(1), "C5").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/meetings/{id}?fields=ata"),
                Some(&token),
                Some(json!({"ata": "Minutes", "images": []})),
            ))
            .await
            .expect("no images");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = test_support::read_json(response).await;
        assert_eq!(body["error"], json!("images are required"));

        let five = vec![DATA_URI; 5];
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/meetings/{id}?fields=ata"),
                Some(&token),
                Some(json!({"ata": "Minutes", "images": five})),
            ))
            .await
            .expect("five images");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = test_support::read_json(response).await;
        assert_eq!(body["error"], json!("you can only add 4 images"));

        let four = vec![DATA_URI; 4];
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/meetings/{id}?fields=ata"),
                Some(&token),
                Some(json!({"ata": "Minutes", "images": four})),
            ))
            .await
            .expect("four images");
        assert_eq!(response.status(), StatusCode::OK);
        let body = test_support::read_json(response).await;
        assert_eq!(body["data"]["images"].as_array().expect("array").len(), 4);
    }

    #[tokio::test]
    async fn reading_a_missing_ata_is_a_404() {
        let (ctx, _teacher, token) = setup_teacher().await;
        let id = create_meeting(&ctx, &token, -Duration::days(1), "C6").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                &format!("/api/meetings/{id}?fields=ata"),
                Some(&token),
                None,
            ))
            .await
            .expect("request");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = test_support::read_json(response).await;
        assert_eq!(body["error"], json!("This meeting has no ATA yet."));
    }
}
