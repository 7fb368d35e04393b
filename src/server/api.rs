use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use axum::Json;
use axum::extract::State;
use log::info;
use tokio::task::block_in_place;

use super::error::{AppError, Result};
use super::state::AppState;
use super::types::*;
use crate::face::Face;
use crate::metrics;

/// 识别一张人脸
#[utoipa::path(
    post,
    path = "/identify",
    request_body = IdentifyRequest,
    responses(
        (status = 200, body = IdentifyResponse),
    )
)]
pub async fn identify_handler(
    State(state): State<Arc<AppState>>,
    Json(data): Json<IdentifyRequest>,
) -> Result<Json<IdentifyResponse>> {
    let start = Instant::now();
    let probe = Face::new("probe", data.vector);

    let engine = state.engine.read().await;
    let (result, nearest) = block_in_place(|| -> Result<_> {
        let search = engine.search(&probe, data.count)?;
        let nearest = search.nearest.into_iter().map(Candidate::from).collect::<Vec<_>>();
        Ok((search.result.map(Candidate::from), nearest))
    })?;

    Ok(Json(IdentifyResponse { time: start.elapsed().as_secs_f64() * 1000., result, nearest }))
}

/// 添加训练人脸
#[utoipa::path(
    post,
    path = "/enroll",
    request_body = EnrollRequest,
    responses(
        (status = 200, body = GalleryUpdateResponse),
    )
)]
pub async fn enroll_handler(
    State(state): State<Arc<AppState>>,
    Json(data): Json<EnrollRequest>,
) -> Result<Json<GalleryUpdateResponse>> {
    let face = Face::new(data.id, data.vector);

    let mut engine = state.engine.write().await;
    if !data.overwrite && engine.gallery().get(face.id()).is_some() {
        return Err(AppError::conflict(anyhow!("人脸 {} 已存在", face.id())));
    }
    // 重建子空间和写文件都会阻塞
    block_in_place(|| -> Result<_> {
        if data.overwrite {
            engine.replace(face.deep_copy())?;
        } else {
            engine.enroll(face.deep_copy())?;
        }
        state.persist(&engine)?;
        Ok(())
    })?;

    info!("已添加 {}，图库共 {} 张人脸", face.id(), engine.gallery().len());
    Ok(Json(GalleryUpdateResponse { changed: true, size: engine.gallery().len() }))
}

/// 移除训练人脸
#[utoipa::path(
    post,
    path = "/withdraw",
    request_body = WithdrawRequest,
    responses(
        (status = 200, body = GalleryUpdateResponse),
    )
)]
pub async fn withdraw_handler(
    State(state): State<Arc<AppState>>,
    Json(data): Json<WithdrawRequest>,
) -> Result<Json<GalleryUpdateResponse>> {
    let mut engine = state.engine.write().await;
    let changed = block_in_place(|| -> Result<_> {
        let changed = engine.withdraw(&Face::new(data.id.clone(), Vec::<f64>::new()))?;
        if changed {
            state.persist(&engine)?;
        }
        Ok(changed)
    })?;
    if changed {
        info!("已移除 {}，图库共 {} 张人脸", data.id, engine.gallery().len());
    }
    Ok(Json(GalleryUpdateResponse { changed, size: engine.gallery().len() }))
}

/// 获取图库信息
#[utoipa::path(
    get,
    path = "/gallery",
    responses(
        (status = 200, body = GalleryResponse),
    )
)]
pub async fn gallery_handler(State(state): State<Arc<AppState>>) -> Result<Json<GalleryResponse>> {
    let engine = state.engine.read().await;
    Ok(Json(GalleryResponse {
        face_length: engine.face_length(),
        rank: engine.rank(),
        threshold: engine.threshold(),
        eigenfaces: engine.eigenfaces().map_or(0, |b| b.ncols()),
        faces: engine.gallery().faces().iter().map(|f| f.id().to_owned()).collect(),
    }))
}

/// 导出 prometheus 指标
pub async fn metrics_handler() -> Result<String> {
    Ok(metrics::gather_text()?)
}
