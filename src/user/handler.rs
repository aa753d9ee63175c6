use axum::extract::{Path, State};
use axum::Json;

use super::model::UserInfo;
use super::Sub;

pub async fn find_one(
    Path(sub): Path<String>,
    user_service: State<super::Service>,
) -> crate::Result<Json<UserInfo>> {
    let info = user_service.find_user_info(&Sub(sub)).await?;
    Ok(Json(info))
}
