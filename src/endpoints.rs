//! The JSON API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to replace or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the net total of each month.
pub const TRANSACTION_STATS: &str = "/api/transactions/stats";
/// The route for the net total of each category.
pub const CATEGORY_STATS: &str = "/api/transactions/stats/categories";
/// The route to get and set the initial balance.
pub const BALANCE: &str = "/api/balance";
/// The route for the initial balance plus all transactions.
pub const BALANCE_TOTAL: &str = "/api/balance/total";
/// The route to list and create recurring expenses.
pub const RECURRING_EXPENSES: &str = "/api/recurring-expenses";
/// The route to delete a recurring expense.
pub const RECURRING_EXPENSE: &str = "/api/recurring-expenses/{recurring_id}";
/// The route to run the materialization job right now.
pub const MATERIALIZE: &str = "/api/recurring-expenses/materialize";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with the next right brace,
/// e.g. '{transaction_id}' in '/api/transactions/{transaction_id}'. Only the
/// first parameter is replaced.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some((prefix, rest)) = endpoint_path.split_once('{') else {
        return endpoint_path.to_owned();
    };

    let suffix = rest.split_once('}').map_or("", |(_, suffix)| suffix);

    format!("{prefix}{id}{suffix}")
}

#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION_STATS);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY_STATS);
        assert_endpoint_is_valid_uri(endpoints::BALANCE);
        assert_endpoint_is_valid_uri(endpoints::BALANCE_TOTAL);
        assert_endpoint_is_valid_uri(endpoints::RECURRING_EXPENSES);
        assert_endpoint_is_valid_uri(endpoints::MATERIALIZE);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::TRANSACTION, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::RECURRING_EXPENSE, 1));
    }

    #[test]
    fn replaces_parameter() {
        assert_eq!(
            format_endpoint(endpoints::TRANSACTION, 12),
            "/api/transactions/12"
        );
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        assert_eq!(format_endpoint("/api/balance", 1), "/api/balance");
    }

    #[test]
    fn parameter_in_middle() {
        assert_eq!(format_endpoint("/hello/{world}/bye", 1), "/hello/1/bye");
    }
}
