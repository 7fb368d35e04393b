use std::time::Instant;

use log::debug;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::eigen::{EigenSolver, SymmetricSolver};
use crate::error::{Error, Result};
use crate::face::Face;
use crate::gallery::TrainingGallery;
use crate::metrics;

pub const DEFAULT_RANK: usize = 16;
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// 范数不超过最大范数这个倍数的特征脸视为退化，直接丢弃
const MIN_RELATIVE_NORM: f64 = 1e-6;

/// 一次成功的识别结果
#[derive(Debug, Clone, Copy)]
pub struct Identification<'a> {
    /// 图库中距离最近的人脸
    pub face: &'a Face,
    /// 投影系数之间的欧氏距离平方
    pub distance: f64,
}

/// 一次识别的完整结果，`nearest` 按距离从小到大排列
#[derive(Debug, Clone)]
pub struct SearchResult<'a> {
    pub result: Option<Identification<'a>>,
    pub nearest: Vec<Identification<'a>>,
}

pub struct EngineBuilder<S = SymmetricSolver> {
    face_length: usize,
    rank: usize,
    threshold: f64,
    solver: S,
}

impl EngineBuilder {
    pub fn new(face_length: usize) -> Self {
        Self {
            face_length,
            rank: DEFAULT_RANK,
            threshold: DEFAULT_THRESHOLD,
            solver: SymmetricSolver::default(),
        }
    }
}

impl<S: EigenSolver> EngineBuilder<S> {
    /// 保留的特征脸数量上限
    pub fn rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    /// 识别成功所允许的最大距离平方（不含）
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn solver<T: EigenSolver>(self, solver: T) -> EngineBuilder<T> {
        EngineBuilder {
            face_length: self.face_length,
            rank: self.rank,
            threshold: self.threshold,
            solver,
        }
    }

    pub fn build(self) -> Result<RecognitionEngine<S>> {
        if self.face_length == 0 {
            return Err(Error::InvalidConfig("face_length must be positive".into()));
        }
        if self.rank == 0 {
            return Err(Error::InvalidConfig("rank must be positive".into()));
        }
        if self.threshold.is_nan() || self.threshold < 0.0 {
            return Err(Error::InvalidConfig(format!("invalid threshold: {}", self.threshold)));
        }
        Ok(RecognitionEngine {
            gallery: TrainingGallery::new(self.face_length),
            rank: self.rank,
            threshold: self.threshold,
            basis: None,
            solver: self.solver,
        })
    }
}

/// Eigenfaces 人脸识别引擎
///
/// 参考 M. Turk, A. Pentland "Eigenfaces for Recognition" (1991)。
/// 每次添加或移除人脸都会从头重算特征脸，以及图库中每张人脸的投影系数
pub struct RecognitionEngine<S = SymmetricSolver> {
    gallery: TrainingGallery,
    rank: usize,
    threshold: f64,
    /// face_length 行，每列是一张单位范数的特征脸；图库为空时为 `None`
    basis: Option<DMatrix<f64>>,
    solver: S,
}

impl RecognitionEngine {
    pub fn new(face_length: usize, rank: usize, threshold: f64) -> Result<Self> {
        EngineBuilder::new(face_length).rank(rank).threshold(threshold).build()
    }
}

impl<S: EigenSolver> RecognitionEngine<S> {
    pub fn face_length(&self) -> usize {
        self.gallery.face_length()
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn gallery(&self) -> &TrainingGallery {
        &self.gallery
    }

    pub fn mean_face(&self) -> Option<&Face> {
        self.gallery.mean_face()
    }

    /// 当前的特征脸矩阵，列数不超过 `min(rank, 图库大小)`
    pub fn eigenfaces(&self) -> Option<&DMatrix<f64>> {
        self.basis.as_ref()
    }

    /// 添加训练人脸并重建子空间，失败时引擎状态不变
    pub fn enroll(&mut self, face: Face) -> Result<()> {
        let mut gallery = self.gallery.clone();
        gallery.enroll(face)?;
        self.commit(gallery)
    }

    /// 批量添加训练人脸，只重建一次子空间
    ///
    /// 任何一张人脸不合法时全部放弃，引擎状态不变。返回添加的数量
    pub fn enroll_all(&mut self, faces: impl IntoIterator<Item = Face>) -> Result<usize> {
        let mut gallery = self.gallery.clone();
        let count = gallery.enroll_all(faces)?;
        if count > 0 {
            self.commit(gallery)?;
        }
        Ok(count)
    }

    /// 移除 id 相同的训练人脸并重建子空间，人脸不存在时返回 `false`
    pub fn withdraw(&mut self, face: &Face) -> Result<bool> {
        if self.gallery.get(face.id()).is_none() {
            return Ok(false);
        }
        let mut gallery = self.gallery.clone();
        gallery.withdraw(face);
        self.commit(gallery)?;
        Ok(true)
    }

    /// 用新的人脸替换 id 相同的旧记录，不存在时直接添加，只重建一次子空间
    ///
    /// 返回是否替换了旧记录
    pub fn replace(&mut self, face: Face) -> Result<bool> {
        let mut gallery = self.gallery.clone();
        let replaced = gallery.withdraw(&face);
        gallery.enroll(face)?;
        self.commit(gallery)?;
        Ok(replaced)
    }

    /// 计算待识别人脸在当前子空间中的投影系数，不修改图库
    pub fn decompose(&self, probe: &Face) -> Result<Vec<f64>> {
        if probe.len() != self.face_length() {
            return Err(Error::DimensionMismatch { expected: self.face_length(), got: probe.len() });
        }
        let basis = self.subspace()?;
        let centered = self.gallery.center_faces(std::slice::from_ref(probe))?;
        Ok(project(basis, centered[0].vector()))
    }

    /// 按图库插入顺序返回待识别人脸到每张训练人脸的距离平方
    pub fn distances(&self, probe: &Face) -> Result<Vec<f64>> {
        let coefficients = self.decompose(probe)?;
        self.gallery
            .faces()
            .iter()
            .map(|face| {
                // 子空间存在时每张人脸都已投影，缺失说明状态不一致
                let theirs = face.coefficients().ok_or(Error::DegenerateSubspace)?;
                Ok(squared_distance(&coefficients, theirs, self.rank))
            })
            .collect()
    }

    /// 返回距离最小的 `count` 张人脸，不考虑阈值；距离相同时保持插入顺序
    pub fn nearest(&self, probe: &Face, count: usize) -> Result<Vec<Identification<'_>>> {
        let distances = self.distances(probe)?;
        Ok(self.rank_nearest(&distances, count))
    }

    /// 识别一张人脸
    ///
    /// 最小距离严格小于阈值时返回对应的训练人脸，否则返回 `None`。
    /// 多张人脸距离相同时取插入顺序最靠前的一张
    pub fn identify(&self, probe: &Face) -> Result<Option<Identification<'_>>> {
        Ok(self.search(probe, 0)?.result)
    }

    /// 识别一张人脸，同时返回距离最近的 `count` 张人脸，待识别人脸只投影一次
    pub fn search(&self, probe: &Face, count: usize) -> Result<SearchResult<'_>> {
        let start = Instant::now();
        let distances = self.distances(probe)?;
        debug!(
            "distance map -> {:?}",
            self.gallery.faces().iter().map(Face::id).zip(&distances).collect::<Vec<_>>()
        );

        let mut best: Option<(usize, f64)> = None;
        for (i, &distance) in distances.iter().enumerate() {
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((i, distance)),
            }
        }

        let result = best.filter(|&(_, distance)| distance < self.threshold).map(|(i, distance)| {
            Identification { face: &self.gallery.faces()[i], distance }
        });
        match &result {
            Some(m) => debug!("smallest distance -> {}; best face -> {}", m.distance, m.face.id()),
            None => debug!("no face within threshold {}", self.threshold),
        }
        let nearest = self.rank_nearest(&distances, count);
        metrics::observe_identify(result.is_some(), start.elapsed());
        Ok(SearchResult { result, nearest })
    }

    /// 按距离排序后取前 `count` 个，排序稳定
    fn rank_nearest(&self, distances: &[f64], count: usize) -> Vec<Identification<'_>> {
        if count == 0 {
            return vec![];
        }
        let mut result = distances
            .iter()
            .zip(self.gallery.faces())
            .map(|(&distance, face)| Identification { face, distance })
            .collect::<Vec<_>>();
        result.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        result.truncate(count);
        result
    }

    fn subspace(&self) -> Result<&DMatrix<f64>> {
        match &self.basis {
            None => Err(Error::EmptyGallery),
            Some(basis) if basis.ncols() == 0 => Err(Error::DegenerateSubspace),
            Some(basis) => Ok(basis),
        }
    }

    /// 为新图库重算特征脸和投影系数，全部成功后才替换当前状态
    fn commit(&mut self, mut gallery: TrainingGallery) -> Result<()> {
        let start = Instant::now();
        let basis = calculate_eigenfaces(&gallery, self.rank, &self.solver)?;
        if let Some(basis) = &basis {
            let coefficients = gallery
                .centered_faces()
                .par_iter()
                .map(|face| project(basis, face.vector()))
                .collect::<Vec<_>>();
            gallery.assign_coefficients(coefficients);
        }

        let elapsed = start.elapsed();
        debug!(
            "rebuilt subspace: {} faces, {} eigenfaces, {:.2}ms",
            gallery.len(),
            basis.as_ref().map_or(0, |b| b.ncols()),
            elapsed.as_secs_f64() * 1000.
        );
        metrics::observe_rebuild(gallery.len(), elapsed);

        self.gallery = gallery;
        self.basis = basis;
        Ok(())
    }
}

/// 使用协方差技巧计算特征脸
///
/// 设 X 为中心化人脸按行组成的 n×d 矩阵，先分解 n×n 的 X·Xᵗ，
/// 再把选中的特征向量 v 映射回人脸空间 Xᵗ·v 并归一化
fn calculate_eigenfaces<S: EigenSolver>(
    gallery: &TrainingGallery,
    rank: usize,
    solver: &S,
) -> Result<Option<DMatrix<f64>>> {
    let centered = gallery.centered_faces();
    if centered.is_empty() {
        return Ok(None);
    }
    let (n, d) = (centered.len(), gallery.face_length());
    let x = DMatrix::from_row_iterator(n, d, centered.iter().flat_map(|f| f.vector().iter().copied()));
    let xt = x.transpose();
    let eigen = solver.decompose(&(&x * &xt))?;

    let faces = eigen
        .ranked()
        .into_iter()
        .take(rank.min(n))
        .map(|i| {
            let face: DVector<f64> = &xt * eigen.vectors.column(i);
            (face.norm(), face)
        })
        .collect::<Vec<_>>();

    let max_norm = faces.iter().map(|(norm, _)| *norm).filter(|n| n.is_finite()).fold(0.0, f64::max);
    let candidates = faces.len();
    let columns = faces
        .into_iter()
        .filter(|(norm, _)| norm.is_finite() && *norm > 0.0 && *norm > MIN_RELATIVE_NORM * max_norm)
        .map(|(norm, face)| face / norm)
        .collect::<Vec<_>>();

    if columns.len() < candidates {
        debug!("dropped {} of {} degenerate eigenfaces", candidates - columns.len(), candidates);
    }
    if columns.is_empty() {
        return Ok(Some(DMatrix::zeros(d, 0)));
    }
    Ok(Some(DMatrix::from_columns(&columns)))
}

/// basisᵗ · vector
fn project(basis: &DMatrix<f64>, vector: &[f64]) -> Vec<f64> {
    basis.tr_mul(&DVector::from_column_slice(vector)).as_slice().to_vec()
}

fn squared_distance(a: &[f64], b: &[f64], dims: usize) -> f64 {
    a.iter().zip(b).take(dims).map(|(x, y)| (x - y).powi(2)).sum()
}
