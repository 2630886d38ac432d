//! Store addressing convention.

/// Compose the base address of one resolution level of a dataset.
///
/// The layout `{api_root}/{dataset_id}/level_{level}/seismic` is shared with
/// the existing store and must not change. The root is used verbatim, so a
/// trailing slash on `api_root` is preserved.
pub fn dataset_address(api_root: &str, dataset_id: &str, level: u32) -> String {
    format!("{}/{}/level_{}/seismic", api_root, dataset_id, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_address_layout() {
        assert_eq!(
            dataset_address("https://data.example.com/zarr", "TNE01", 0),
            "https://data.example.com/zarr/TNE01/level_0/seismic"
        );
    }

    #[test]
    fn test_dataset_address_keeps_root_verbatim() {
        assert_eq!(dataset_address("/data/", "F3", 2), "/data//F3/level_2/seismic");
    }
}
