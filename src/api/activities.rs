use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::auth::validation_messages;
use crate::api::errors::ApiError;
use crate::api::guards::{authenticate, require_valid_id, require_verified, CurrentUser};
use crate::api::query::{self, ActivitiesListIntent, ActivityDetailIntent};
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::db::models::Activity;
use crate::repositories;
use crate::repositories::activities::{CreateActivity, ListActivitiesParams};
use crate::schemas::activity::{
    ActivityCreate, ActivityFinish, ActivityResponse, ReportResponse, ThemeResponse,
};
use crate::schemas::DataResponse;
use crate::services::images::{store_image, validate_data_uri};
use crate::tasks::gamification::GamificationEvent;

const IMAGE_KIND_PLAN: &str = "plan";
const IMAGE_KIND_REPORT: &str = "report";
const RECENT_LIMIT: i64 = 3;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(detail).patch(finish).delete(remove))
}

/// `GET /api/activities`, public; the validated intent picks the listing.
async fn list(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let intent = query::activities_list(&pairs).map_err(ApiError::Validation)?;

    match intent {
        ActivitiesListIntent::Search { title } => {
            let found = repositories::activities::search_unfinished_by_title(state.db(), &title)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to search activities"))?;
            if found.is_empty() {
                return Err(ApiError::NotFound(format!(
                    "no activities found with title {title}"
                )));
            }
            respond_activities(&state, found).await
        }
        ActivitiesListIntent::Themes => {
            let themes = repositories::themes::list(state.db())
                .await
                .map_err(|e| ApiError::internal(e, "Failed to list themes"))?
                .into_iter()
                .map(ThemeResponse::from_db)
                .collect::<Vec<_>>();
            Ok(Json(DataResponse::new(themes)).into_response())
        }
        ActivitiesListIntent::Recent => {
            let found =
                repositories::activities::list_recent_unfinished(state.db(), RECENT_LIMIT)
                    .await
                    .map_err(|e| ApiError::internal(e, "Failed to list recent activities"))?;
            respond_activities(&state, found).await
        }
        ActivitiesListIntent::Unfinished { school } => {
            let school_id = resolve_school(&state, school.as_deref()).await?;
            let found = repositories::activities::list(
                state.db(),
                ListActivitiesParams {
                    is_finished: Some(false),
                    school_id: school_id.as_deref(),
                    year: None,
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list activities"))?;
            respond_activities(&state, found).await
        }
        ActivitiesListIntent::Finished { school, year } => {
            let school_id = resolve_school(&state, school.as_deref()).await?;
            let found = repositories::activities::list(
                state.db(),
                ListActivitiesParams {
                    is_finished: Some(true),
                    school_id: school_id.as_deref(),
                    year,
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list activities"))?;
            respond_activities(&state, found).await
        }
        ActivitiesListIntent::School { school } => {
            let school_id = resolve_school(&state, Some(&school)).await?;
            let found = repositories::activities::list(
                state.db(),
                ListActivitiesParams {
                    is_finished: None,
                    school_id: school_id.as_deref(),
                    year: None,
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list activities"))?;
            respond_activities(&state, found).await
        }
    }
}

/// `GET /api/activities/:id`. The plain detail view is public; the report
/// view requires a verified caller, checked before the id is even parsed.
async fn detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let intent = query::activity_detail(&pairs).map_err(ApiError::Validation)?;

    match intent {
        ActivityDetailIntent::Detail => {
            require_valid_id(&id)?;
            let activity = fetch_activity(&state, &id).await?;
            let response = activity_response(&state, activity).await?;
            Ok(Json(DataResponse::new(response)).into_response())
        }
        ActivityDetailIntent::Report => {
            let user = authenticate(&state, &headers).await?;
            require_verified(&user)?;
            require_valid_id(&id)?;
            let activity = fetch_activity(&state, &id).await?;
            let Some(report) = activity.report else {
                return Err(ApiError::NotFound("Activity is not finished yet.".to_string()));
            };
            let images =
                repositories::activities::list_images(state.db(), &activity.id, IMAGE_KIND_REPORT)
                    .await
                    .map_err(|e| ApiError::internal(e, "Failed to list report images"))?
                    .into_iter()
                    .map(|image| image.url)
                    .collect();
            Ok(Json(DataResponse::new(ReportResponse {
                id: activity.id,
                title: activity.title,
                report,
                images,
            }))
            .into_response())
        }
    }
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ActivityCreate>,
) -> Result<(StatusCode, Json<DataResponse<ActivityResponse>>), ApiError> {
    require_verified(&user)?;
    payload.validate().map_err(validation_messages)?;
    check_images(&payload.images)?;

    let known_theme = repositories::themes::exists(state.db(), &payload.theme_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check theme"))?;
    if !known_theme {
        return Err(ApiError::NotFound("Theme not found.".to_string()));
    }

    let now = primitive_now_utc();
    let activity = repositories::activities::create(
        state.db(),
        CreateActivity {
            id: &Uuid::new_v4().to_string(),
            creator_id: &user.id,
            school_id: &user.school_id,
            theme_id: &payload.theme_id,
            title: &payload.title,
            complexity: payload.complexity,
            initial_date: to_primitive_utc(payload.initial_date),
            final_date: to_primitive_utc(payload.final_date),
            objective: &payload.objective,
            diagnostic: &payload.diagnostic,
            meta: &payload.meta,
            resources: &payload.resources,
            participants: &payload.participants,
            evaluation_indicator: &payload.evaluation_indicator,
            evaluation_method: &payload.evaluation_method,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create activity"))?;

    store_activity_images(&state, &activity.id, IMAGE_KIND_PLAN, &payload.images).await?;

    state.gamification().dispatch(GamificationEvent::ActivityCreated { user_id: user.id });

    let response = activity_response(&state, activity).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(response))))
}

/// `PATCH /api/activities/:id`, the terminal Draft -> Finished transition.
async fn finish(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ActivityFinish>,
) -> Result<Json<DataResponse<ActivityResponse>>, ApiError> {
    require_verified(&user)?;
    require_valid_id(&id)?;

    let activity = fetch_activity(&state, &id).await?;
    if activity.is_finished {
        return Err(ApiError::Conflict("Activity is already finished.".to_string()));
    }

    let report = match payload.report.as_deref() {
        Some(report) if !report.is_empty() => report,
        _ => return Err(ApiError::BadRequest("report is required".to_string())),
    };
    check_images(&payload.images)?;

    repositories::activities::finish(state.db(), &id, report, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to finish activity"))?;

    store_activity_images(&state, &id, IMAGE_KIND_REPORT, &payload.images).await?;

    state.gamification().dispatch(GamificationEvent::ActivityFinished { user_id: user.id });

    let finished = fetch_activity(&state, &id).await?;
    let response = activity_response(&state, finished).await?;
    Ok(Json(DataResponse::new(response)))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<String>>, ApiError> {
    require_verified(&user)?;
    require_valid_id(&id)?;

    let deleted = repositories::activities::delete(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete activity"))?;
    if !deleted {
        return Err(ApiError::NotFound("Activity not found.".to_string()));
    }

    Ok(Json(DataResponse::new("Activity deleted.".to_string())))
}

async fn fetch_activity(state: &AppState, id: &str) -> Result<Activity, ApiError> {
    repositories::activities::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch activity"))?
        .ok_or_else(|| ApiError::NotFound("Activity not found.".to_string()))
}

/// Resolves an optional school name to its id; unknown names are a 404
/// before any listing query runs.
async fn resolve_school(
    state: &AppState,
    school: Option<&str>,
) -> Result<Option<String>, ApiError> {
    match school {
        Some(name) => {
            let school = repositories::schools::find_by_name(state.db(), name)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to look up school"))?
                .ok_or_else(|| ApiError::NotFound("School not found.".to_string()))?;
            Ok(Some(school.id))
        }
        None => Ok(None),
    }
}

fn check_images(images: &[String]) -> Result<(), ApiError> {
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

async fn store_activity_images(
    state: &AppState,
    activity_id: &str,
    kind: &str,
    images: &[String],
) -> Result<(), ApiError> {
    let now = primitive_now_utc();
    for (index, data_uri) in images.iter().enumerate() {
        let url = store_image(state.images(), data_uri).await;
        repositories::activities::add_image(
            state.db(),
            &Uuid::new_v4().to_string(),
            activity_id,
            kind,
            &url,
            index as i32,
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store activity image"))?;
    }
    Ok(())
}

async fn respond_activities(
    state: &AppState,
    activities: Vec<Activity>,
) -> Result<Response, ApiError> {
    let mut responses = Vec::with_capacity(activities.len());
    for activity in activities {
        responses.push(activity_response(state, activity).await?);
    }
    Ok(Json(DataResponse::new(responses)).into_response())
}

async fn activity_response(
    state: &AppState,
    activity: Activity,
) -> Result<ActivityResponse, ApiError> {
    let images =
        repositories::activities::list_images(state.db(), &activity.id, IMAGE_KIND_PLAN)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list activity images"))?
            .into_iter()
            .map(|image| image.url)
            .collect();
    Ok(ActivityResponse::from_db(activity, images))
}
