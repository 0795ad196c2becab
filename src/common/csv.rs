//! Helpers for the comma-delimited columns the data model uses for
//! multi-valued attributes (service lists, evidence-type lists,
//! target-framework lists).

/// Join values into the delimited form stored in the database.
pub fn join_csv(values: &[String]) -> String {
    values.join(",")
}

/// Split a stored delimited value back into a list.
///
/// Segments are trimmed and empty segments dropped, so `""` and `" , "`
/// both yield an empty list.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_round_trips_join() {
        let values = vec!["EC2".to_string(), "S3".to_string(), "IAM".to_string()];
        assert_eq!(split_csv(&join_csv(&values)), values);
    }

    #[test]
    fn split_trims_and_drops_empty_segments() {
        assert_eq!(split_csv(" S3 , , GuardDuty "), vec!["S3", "GuardDuty"]);
        assert_eq!(split_csv(""), Vec::<String>::new());
        assert_eq!(split_csv(" , "), Vec::<String>::new());
    }

    #[test]
    fn join_of_empty_list_is_empty_string() {
        assert_eq!(join_csv(&[]), "");
    }
}
