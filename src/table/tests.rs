// Table module tests

#[cfg(test)]
mod table_tests {
    use crate::table::{ColumnSpec, TableBuilder, is_valid_identifier};
    use crate::types::ColumnType;

    #[test]
    fn test_identifier_rules() {
        assert!(is_valid_identifier("users"));
        assert!(is_valid_identifier("_tmp1"));
        assert!(is_valid_identifier("Orders_2024"));

        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("9lives"));
        assert!(!is_valid_identifier("a-b"));
        assert!(!is_valid_identifier("a\"; drop"));
        assert!(!is_valid_identifier("../etc"));
    }

    #[test]
    fn test_builder_output_is_ordered() {
        let table = TableBuilder::new("t1".to_string())
            .column(ColumnSpec::nullable("age", ColumnType::Int32))
            .column(ColumnSpec::nullable("active", ColumnType::Bool))
            .try_build()
            .unwrap();

        let names: Vec<&str> = table.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["age", "active"]);
        for (i, col) in table.columns().iter().enumerate() {
            assert_eq!(col.ordinal(), i as u32);
            assert!(col.is_nullable());
        }
    }
}
