use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Outlet,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOutletRequest {
    pub lat: f64,
    pub lng: f64,
}

impl CreateOutletRequest {
    pub fn validate(&self) -> AppResult<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(AppError::Validation("lat must be between -90 and 90".into()));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(AppError::Validation("lng must be between -180 and 180".into()));
        }
        Ok(())
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct OutletList {
    #[schema(value_type = Vec<Outlet>)]
    pub items: Vec<Outlet>,
}
