//! Executing queries and commands through a connection.

mod common;
use common::*;

use oxide_query::{Connection, Params, Query, QueryError, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

fn users() -> Query {
    Query::new()
        .select("id, name")
        .from("user")
        .where_clause(json!({"active": true}))
}

#[tokio::test]
async fn all_returns_rows_and_runs_raw_sql() {
    let db = MockConnection::new();
    db.push_rows(vec![
        row(&[("id", Value::Int(1)), ("name", Value::from("ann"))]),
        row(&[("id", Value::Int(2)), ("name", Value::from("bob"))]),
    ]);
    let rows = users().all(&db).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["name"], Value::from("bob"));
    assert_eq!(
        db.last_sql(),
        r#"SELECT "id", "name" FROM "user" WHERE "active" = TRUE"#
    );
}

#[tokio::test]
async fn one_scalar_and_column() {
    let db = MockConnection::new();
    db.push_rows(vec![row(&[("id", Value::Int(1))])]);
    assert_eq!(
        users().one(&db).await.unwrap(),
        Some(row(&[("id", Value::Int(1))]))
    );

    assert_eq!(users().one(&db).await.unwrap(), None);

    db.push_scalar("ann");
    assert_eq!(users().scalar(&db).await.unwrap(), Some(Value::from("ann")));

    db.push_rows(vec![
        row(&[("id", Value::Int(1)), ("name", Value::from("ann"))]),
        row(&[("id", Value::Int(2)), ("name", Value::from("bob"))]),
    ]);
    assert_eq!(
        users().column(&db).await.unwrap(),
        [Value::Int(1), Value::Int(2)]
    );
}

#[tokio::test]
async fn exists_wraps_query() {
    let db = MockConnection::new();
    db.push_scalar(true);
    assert!(users().exists(&db).await.unwrap());
    assert_eq!(
        db.last_sql(),
        r#"SELECT EXISTS(SELECT "id", "name" FROM "user" WHERE "active" = TRUE)"#
    );

    db.push_scalar(0);
    assert!(!users().exists(&db).await.unwrap());
}

#[tokio::test]
async fn count_drops_ordering_and_paging() {
    let db = MockConnection::new();
    db.push_scalar("42");
    let query = users().order_by("name").limit(10_u64).offset(20_u64);
    assert_eq!(query.count(&db, "*").await.unwrap(), 42);
    assert_eq!(
        db.last_sql(),
        r#"SELECT COUNT(*) FROM "user" WHERE "active" = TRUE"#
    );
}

#[tokio::test]
async fn aggregates_over_grouped_query_use_subquery() {
    let db = MockConnection::new();
    db.push_scalar(3);
    let query = Query::new()
        .select("customer_id")
        .from("order")
        .group_by("customer_id")
        .having(json!([">", "customer_id", 10]));
    assert_eq!(query.count(&db, "*").await.unwrap(), 3);
    assert_eq!(
        db.last_sql(),
        concat!(
            r#"SELECT COUNT(*) FROM (SELECT "customer_id" FROM "order" "#,
            r#"GROUP BY "customer_id" HAVING "customer_id" > 10) AS "c""#
        )
    );
}

#[tokio::test]
async fn sum_average_min_max() {
    let db = MockConnection::new();
    let query = Query::new().from("order");
    db.push_scalar(100);
    db.push_scalar(12.5);
    db.push_scalar(1);
    db.push_scalar(99);
    assert_eq!(query.sum(&db, "amount").await.unwrap(), Some(Value::Int(100)));
    assert_eq!(query.average(&db, "amount").await.unwrap(), Some(Value::Float(12.5)));
    assert_eq!(query.min(&db, "amount").await.unwrap(), Some(Value::Int(1)));
    assert_eq!(query.max(&db, "amount").await.unwrap(), Some(Value::Int(99)));
    assert_eq!(
        db.executed(),
        [
            r#"SELECT SUM(amount) FROM "order""#,
            r#"SELECT AVG(amount) FROM "order""#,
            r#"SELECT MIN(amount) FROM "order""#,
            r#"SELECT MAX(amount) FROM "order""#,
        ]
    );
}

#[tokio::test]
async fn command_execute_reports_row_count() {
    let db = MockConnection::new();
    db.push_rows(vec![Default::default(), Default::default()]);
    let (sql, params) = db
        .query_builder()
        .update("user", [("active", false)], json!({"id": [1, 2]}))
        .unwrap();
    let result = db.create_command(sql, params).execute().await.unwrap();
    assert_eq!(result.row_count, 2);
    assert_eq!(
        db.last_sql(),
        r#"UPDATE "user" SET "active" = FALSE WHERE "id" IN (1, 2)"#
    );
}

#[tokio::test]
async fn insert_and_delete_through_commands() {
    let db = MockConnection::from_config(r#"{"driver": "mysql", "tablePrefix": "app_"}"#);
    let builder = db.query_builder();
    let (sql, params) = builder
        .insert("{{%user}}", [("name", "ann"), ("email", "ann@example.test")])
        .unwrap();
    db.create_command(sql, params).execute().await.unwrap();
    let (sql, params) = builder.delete("{{%user}}", json!({"name": "ann"})).unwrap();
    db.create_command(sql, params).execute().await.unwrap();
    assert_eq!(
        db.executed(),
        [
            "INSERT INTO `app_user` (`name`, `email`) VALUES ('ann', 'ann@example.test')",
            "DELETE FROM `app_user` WHERE `name` = 'ann'",
        ]
    );
}

#[tokio::test]
async fn execution_errors_surface_unmodified() {
    let db = MockConnection::failing();
    let err = users().all(&db).await.unwrap_err();
    assert!(matches!(err, QueryError::Execution(_)));
    assert_eq!(err.to_string(), "execution failed: connection refused");
}

#[tokio::test]
async fn malformed_condition_never_reaches_database() {
    let db = MockConnection::new();
    let query = Query::new().from("t").where_clause(json!([["nested"], 1]));
    let err = query.all(&db).await.unwrap_err();
    assert!(matches!(err, QueryError::MalformedCondition { .. }));
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn commands_bind_values_before_execution() {
    let db = MockConnection::new();
    db.create_command("DELETE FROM t WHERE id = :id", Params::new())
        .bind_value("id", 9)
        .execute()
        .await
        .unwrap();
    assert_eq!(db.last_sql(), "DELETE FROM t WHERE id = 9");
}
