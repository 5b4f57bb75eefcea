//! Shared primitive types used across the engine.

/// Store name as it appears in both input tables. Primary join key.
pub type StoreName = String;

/// Comparison group identifier (`grupo_comparavel`), e.g. `"1-0"`.
pub type GroupId = String;

/// Regional management number (`NumeroGR`).
pub type RegionId = i64;
