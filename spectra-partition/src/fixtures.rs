//! Synthetic coadd files with the same layout as the production partitions.

use std::{path::Path, sync::Arc};

use arrow::{
    array::{Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use netcdf::Extents;

use crate::{
    arm::ArrayKind, Arm, PartitionCoordinates, PartitionPath, PartitionResolver, FIBERMAP_GROUP,
    ROW_IDENTIFIER_VARIABLE, SCORES_GROUP,
};

/// One catalog row pointing at a partition.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub targetid: i64,
    pub survey: &'static str,
    pub program: &'static str,
    pub healpix: i64,
}

impl CatalogEntry {
    pub fn new(targetid: i64, survey: &'static str, program: &'static str, healpix: i64) -> Self {
        Self {
            targetid,
            survey,
            program,
            healpix,
        }
    }

    pub fn coordinates(&self) -> PartitionCoordinates {
        PartitionCoordinates {
            survey: self.survey.to_string(),
            program: self.program.to_string(),
            healpix: self.healpix as u64,
        }
    }
}

/// Catalog with the routing columns plus `Z` and `SPECTYPE`.
pub fn catalog_batch(entries: &[CatalogEntry]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("TARGETID", DataType::Int64, false),
        Field::new("SURVEY", DataType::Utf8, false),
        Field::new("PROGRAM", DataType::Utf8, false),
        Field::new("HEALPIX", DataType::Int64, false),
        Field::new("Z", DataType::Float64, true),
        Field::new("SPECTYPE", DataType::Utf8, true),
    ]));

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from_iter_values(entries.iter().map(|e| e.targetid))),
            Arc::new(StringArray::from_iter_values(entries.iter().map(|e| e.survey))),
            Arc::new(StringArray::from_iter_values(entries.iter().map(|e| e.program))),
            Arc::new(Int64Array::from_iter_values(entries.iter().map(|e| e.healpix))),
            Arc::new(Float64Array::from_iter_values(
                (0..entries.len()).map(|i| 0.5 + i as f64 * 0.25),
            )),
            Arc::new(StringArray::from_iter_values(entries.iter().map(|_| "GALAXY"))),
        ],
    )
    .expect("catalog fixture columns line up")
}

/// Writes `fixture` where `resolver` expects the partition of `entry`.
pub fn write_partition(
    resolver: &PartitionResolver,
    entry: &CatalogEntry,
    fixture: &CoaddFixture,
) -> Result<PartitionPath, Box<dyn std::error::Error>> {
    let partition = resolver.path_for(entry.coordinates());
    if let Some(parent) = partition.path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    fixture.write(&partition)?;
    Ok(partition)
}

#[derive(Debug, Clone)]
pub struct CoaddFixture {
    pub targetids: Vec<i64>,
    pub arms: Vec<Arm>,
    pub fibermap: bool,
    pub scores: bool,
    /// Arm whose wavelength grid gets one sample more than its flux rows.
    pub mismatched_arm: Option<Arm>,
}

impl CoaddFixture {
    pub const SCORE_NAMES: [&'static str; 3] = ["TSNR2_ELG", "TSNR2_LRG", "INTEG_COADD_FLUX_B"];
    /// Score stored as `(fiber, 1)`.
    pub const SCORE_COEFF: &'static str = "TSNR2_COEFF";
    /// Scores group variable indexed by nights instead of fibers.
    pub const SCORE_NIGHTS: &'static str = "NIGHTS";

    pub fn new(targetids: Vec<i64>) -> Self {
        Self {
            targetids,
            arms: Arm::ALL.to_vec(),
            fibermap: true,
            scores: true,
            mismatched_arm: None,
        }
    }

    pub fn without_fibermap(mut self) -> Self {
        self.fibermap = false;
        self
    }

    pub fn without_scores(mut self) -> Self {
        self.scores = false;
        self
    }

    pub fn without_arm(mut self, arm: Arm) -> Self {
        self.arms.retain(|a| *a != arm);
        self
    }

    pub fn with_mismatched_arm(mut self, arm: Arm) -> Self {
        self.mismatched_arm = Some(arm);
        self
    }

    pub fn wave_len(arm: Arm) -> usize {
        match arm {
            Arm::B => 5,
            Arm::R => 4,
            Arm::Z => 6,
        }
    }

    pub fn wavelength(&self, arm: Arm) -> Vec<f64> {
        let start = match arm {
            Arm::B => 3600.0,
            Arm::R => 5760.0,
            Arm::Z => 7520.0,
        };
        let len = Self::wave_len(arm) + usize::from(self.mismatched_arm == Some(arm));
        (0..len).map(|i| start + 0.8 * i as f64).collect()
    }

    pub fn flux(&self, arm: Arm, row: usize) -> Vec<f32> {
        (0..Self::wave_len(arm))
            .map(|i| row as f32 * 10.0 + i as f32 * 0.5)
            .collect()
    }

    pub fn ivar(&self, arm: Arm, row: usize) -> Vec<f32> {
        (0..Self::wave_len(arm))
            .map(|i| 1.0 / (1 + row + i) as f32)
            .collect()
    }

    pub fn mask(&self, arm: Arm, row: usize) -> Vec<i32> {
        (0..Self::wave_len(arm))
            .map(|i| ((row + i) % 2) as i32)
            .collect()
    }

    pub fn score(&self, score: usize, row: usize) -> f32 {
        (score * 100 + row) as f32 + 0.25
    }

    fn per_row<T: Copy>(&self, row_values: impl Fn(usize) -> Vec<T>) -> Vec<T> {
        (0..self.targetids.len()).flat_map(row_values).collect()
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), netcdf::Error> {
        let rows = self.targetids.len();
        let mut nc = netcdf::create(path)?;
        nc.add_dimension("fiber", rows)?;

        for arm in &self.arms {
            let arm = *arm;
            let wave_dim = format!("wave_{}", arm.as_str().to_lowercase());
            let grid_dim = format!("{}_grid", wave_dim);
            let wavelength = self.wavelength(arm);
            nc.add_dimension(&wave_dim, Self::wave_len(arm))?;
            nc.add_dimension(&grid_dim, wavelength.len())?;

            let mut var =
                nc.add_variable::<f64>(&arm.array_name(ArrayKind::Wavelength), &[grid_dim.as_str()])?;
            var.put_values(&wavelength, Extents::All)?;

            let mut var =
                nc.add_variable::<f32>(&arm.array_name(ArrayKind::Flux), &["fiber", &wave_dim])?;
            var.put_values(&self.per_row(|row| self.flux(arm, row)), Extents::All)?;

            let mut var =
                nc.add_variable::<f32>(&arm.array_name(ArrayKind::Ivar), &["fiber", &wave_dim])?;
            var.put_values(&self.per_row(|row| self.ivar(arm, row)), Extents::All)?;

            let mut var =
                nc.add_variable::<i32>(&arm.array_name(ArrayKind::Mask), &["fiber", &wave_dim])?;
            var.put_values(&self.per_row(|row| self.mask(arm, row)), Extents::All)?;
        }

        if self.fibermap {
            let mut group = nc.add_group(FIBERMAP_GROUP)?;
            group.add_dimension("fiber", rows)?;
            let mut var = group.add_variable::<i64>(ROW_IDENTIFIER_VARIABLE, &["fiber"])?;
            var.put_values(&self.targetids, Extents::All)?;
        }

        if self.scores {
            let mut group = nc.add_group(SCORES_GROUP)?;
            group.add_dimension("fiber", rows)?;
            for (score, name) in Self::SCORE_NAMES.iter().enumerate() {
                let values = (0..rows).map(|row| self.score(score, row)).collect::<Vec<_>>();
                let mut var = group.add_variable::<f32>(name, &["fiber"])?;
                var.put_values(&values, Extents::All)?;
            }

            group.add_dimension("coeff", 1)?;
            let values = (0..rows)
                .map(|row| self.score(Self::SCORE_NAMES.len(), row))
                .collect::<Vec<_>>();
            let mut var = group.add_variable::<f32>(Self::SCORE_COEFF, &["fiber", "coeff"])?;
            var.put_values(&values, Extents::All)?;

            group.add_dimension("night", 2)?;
            let mut var = group.add_variable::<i32>(Self::SCORE_NIGHTS, &["night"])?;
            var.put_values(&[20210505i32, 20210506], Extents::All)?;
        }

        Ok(())
    }
}
