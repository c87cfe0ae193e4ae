use std::time::Duration;

use store_management_api::{db::with_timeout, error::AppError};

#[tokio::test]
async fn elapsed_deadline_is_a_timeout() {
    let result = with_timeout(Duration::from_millis(10), async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok::<_, AppError>(42)
    })
    .await;

    let err = result.expect_err("deadline elapses first");
    assert!(matches!(err, AppError::Timeout));
    assert!(err.is_transient());
}

#[tokio::test]
async fn calls_within_the_deadline_pass_through() -> anyhow::Result<()> {
    let value = with_timeout(Duration::from_secs(1), async { Ok::<_, sqlx::Error>(7) }).await?;
    assert_eq!(value, 7);

    let err = with_timeout(Duration::from_secs(1), async {
        Err::<(), _>(sqlx::Error::RowNotFound)
    })
    .await
    .expect_err("inner error is kept");
    assert!(matches!(err, AppError::DbError(sqlx::Error::RowNotFound)));
    Ok(())
}

#[test]
fn ambiguous_commit_failures_are_not_transient() {
    let io = sqlx::Error::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection reset",
    ));
    for err in [AppError::Timeout, AppError::DbError(io)] {
        assert!(err.is_transient());
        let after = err.after_commit();
        assert!(matches!(after, AppError::CommitOutcomeUnknown));
        assert!(!after.is_transient());
    }

    let rejected = AppError::Storage("constraint violated".into()).after_commit();
    assert!(matches!(rejected, AppError::Storage(_)));
}
