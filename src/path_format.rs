//! Path and label rendering, supplied per tree variant.

use indextree::NodeId;
use std::fmt::Debug;
use std::path::MAIN_SEPARATOR_STR;

use crate::error::TreeError;
use crate::tree::TmTree;

/// Hooks a tree variant provides to turn nodes into path strings.
///
/// Both hooks default to [`TreeError::Unimplemented`]; a variant must opt in to
/// each one.
pub trait PathFormat: Debug {
    /// String placed between names in a path from the root.
    fn separator(&self) -> Result<&str, TreeError> {
        Err(TreeError::Unimplemented("separator"))
    }

    /// Descriptor appended after a node's path.
    fn suffix(&self, _tree: &TmTree, _id: NodeId) -> Result<String, TreeError> {
        Err(TreeError::Unimplemented("suffix"))
    }
}

/// Variant for trees with no path rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unformatted;

impl PathFormat for Unformatted {}

/// Files and folders: platform separator, `(file, 1.00kB)` style suffixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemFormat;

impl PathFormat for FileSystemFormat {
    fn separator(&self) -> Result<&str, TreeError> {
        Ok(MAIN_SEPARATOR_STR)
    }

    fn suffix(&self, tree: &TmTree, id: NodeId) -> Result<String, TreeError> {
        let count = tree.children(id).len();
        let kind = if count == 0 {
            "file".to_string()
        } else {
            format!("folder, {} items", count)
        };
        Ok(format!(" ({}, {})", kind, format_size(tree.data_size(id))))
    }
}

/// Human readable size in binary units with two decimals, capped at TB.
pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
    let mut value = size as f64;
    let mut unit_index = 0;
    while value >= 1024.0 && unit_index < UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }
    format!("{:.2}{}", value, UNITS[unit_index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0.00B");
        assert_eq!(format_size(1023), "1023.00B");
        assert_eq!(format_size(1024), "1.00kB");
        assert_eq!(format_size(1536), "1.50kB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00MB");
        assert_eq!(format_size(3 * 1024u64.pow(5)), "3072.00TB");
    }

    #[test]
    fn test_file_system_suffix() {
        let mut tree = TmTree::with_seed(2).with_format(Box::new(FileSystemFormat));
        let a = tree.new_leaf("a", 2048);
        let b = tree.new_leaf("b", 2048);
        let dir = tree.new_node("dir", vec![a, b], 0).unwrap();

        assert_eq!(tree.get_suffix(a).unwrap(), " (file, 2.00kB)");
        assert_eq!(tree.get_suffix(dir).unwrap(), " (folder, 2 items, 4.00kB)");
        assert_eq!(tree.get_separator().unwrap(), MAIN_SEPARATOR_STR);
    }

    #[test]
    fn test_custom_variant_can_opt_into_one_hook() {
        #[derive(Debug)]
        struct Dotted;
        impl PathFormat for Dotted {
            fn separator(&self) -> Result<&str, TreeError> {
                Ok(".")
            }
        }

        let mut tree = TmTree::with_seed(2).with_format(Box::new(Dotted));
        let leaf = tree.new_leaf("leaf", 1);
        let root = tree.new_node("pkg", vec![leaf], 0).unwrap();

        assert_eq!(tree.get_path_string(leaf).unwrap(), "pkg.leaf");
        assert!(matches!(
            tree.get_suffix(root),
            Err(TreeError::Unimplemented("suffix"))
        ));
    }
}
