//! Strip Routes
//!
//! Read the strip and change its configuration.
//!
//! - GET /api/v1/strip - Snapshot of dimensions, bends, setup and colors
//! - GET /api/v1/strip/layout - Computed element positions
//! - PUT /api/v1/strip/bends - Replace the bend list
//! - POST /api/v1/strip/bends - Append one bend
//! - PUT /api/v1/strip/color-setup - Replace the color setup
//! - POST /api/v1/strip/fill - Set every LED to one color

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::FillRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::color::{Color, ColorSetup};
use crate::geometry::{Bend, Point};
use crate::strip::{StripHandle, StripSnapshot};

/// GET /api/v1/strip
pub async fn get_strip(State(state): State<Arc<AppState>>) -> ApiResult<Json<StripSnapshot>> {
    Ok(Json(snapshot(&state.strip).await?))
}

/// GET /api/v1/strip/layout
pub async fn get_layout(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Point>>> {
    let snapshot = snapshot(&state.strip).await?;
    Ok(Json(snapshot.layout()))
}

/// PUT /api/v1/strip/bends
pub async fn set_bends(
    State(state): State<Arc<AppState>>,
    Json(bends): Json<Vec<Bend>>,
) -> ApiResult<StatusCode> {
    for bend in &bends {
        validate_bend(bend)?;
    }
    submitted(state.strip.set_bends(bends))
}

/// POST /api/v1/strip/bends
pub async fn add_bend(
    State(state): State<Arc<AppState>>,
    Json(bend): Json<Bend>,
) -> ApiResult<StatusCode> {
    validate_bend(&bend)?;
    submitted(state.strip.add_bend(bend))
}

/// PUT /api/v1/strip/color-setup
pub async fn set_color_setup(
    State(state): State<Arc<AppState>>,
    Json(setup): Json<ColorSetup>,
) -> ApiResult<StatusCode> {
    validate_color_setup(&setup)?;
    submitted(state.strip.set_color_setup(setup))
}

/// POST /api/v1/strip/fill
pub async fn fill(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FillRequest>,
) -> ApiResult<StatusCode> {
    let color: Color = req
        .color
        .parse()
        .map_err(|e| ApiError::Validation(format!("Invalid color {:?}: {}", req.color, e)))?;
    submitted(state.strip.fill(color))
}

async fn snapshot(strip: &StripHandle) -> ApiResult<StripSnapshot> {
    strip.snapshot().await.ok_or(ApiError::EngineStopped)
}

fn submitted(accepted: bool) -> ApiResult<StatusCode> {
    if accepted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::EngineStopped)
    }
}

fn validate_bend(bend: &Bend) -> ApiResult<()> {
    if !bend.length.is_finite() || !bend.angle.is_finite() {
        return Err(ApiError::Validation(
            "Bend length and angle must be finite".to_string(),
        ));
    }
    Ok(())
}

fn validate_color_setup(setup: &ColorSetup) -> ApiResult<()> {
    for channel in &setup.channels {
        if !(0.0..=255.0).contains(&channel.value) {
            return Err(ApiError::Validation(format!(
                "{:?} channel value must be within [0, 255], got {}",
                channel.name, channel.value
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bend() {
        assert!(validate_bend(&Bend::new(1.0, 90.0)).is_ok());
        assert!(validate_bend(&Bend::new(f64::INFINITY, 90.0)).is_err());
        assert!(validate_bend(&Bend::new(1.0, f64::NAN)).is_err());
    }

    #[test]
    fn test_validate_color_setup() {
        assert!(validate_color_setup(&ColorSetup::pass_through()).is_ok());
        assert!(validate_color_setup(&ColorSetup::muted()).is_ok());
        assert!(validate_color_setup(&ColorSetup::rgb(256.0, 0.0, 0.0)).is_err());
        assert!(validate_color_setup(&ColorSetup::rgb(0.0, -1.0, 0.0)).is_err());
    }

    #[test]
    fn test_stopped_engine_is_unavailable() {
        assert!(matches!(submitted(false), Err(ApiError::EngineStopped)));
        assert_eq!(submitted(true).unwrap(), StatusCode::NO_CONTENT);
    }
}
