//! Transaction scope helpers: run a body against an open transaction,
//! commit on success, roll back on failure while preserving the body's
//! original error.

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use tracing::warn;

/// An open transaction.
pub trait TxHandle {
    type Error: Display;

    fn commit(self) -> Result<(), Self::Error>;
    fn rollback(self) -> Result<(), Self::Error>;
}

/// Begin a transaction from an idle connection.
pub trait BeginTx {
    type Tx: TxHandle;

    fn begin(self) -> Result<Self::Tx, <Self::Tx as TxHandle>::Error>;
}

/// Run `body` inside a transaction. Commits on success. On failure rolls
/// back and returns the body's error; a rollback failure is logged, never
/// raised over the original error.
pub fn with_transaction<B, T, E, F>(conn: B, body: F) -> Result<T, E>
where
    B: BeginTx,
    E: From<<B::Tx as TxHandle>::Error>,
    F: FnOnce(&mut B::Tx) -> Result<T, E>,
{
    let mut tx = conn.begin()?;
    match body(&mut tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(error = %rollback_err, "rollback failed after body error");
            }
            Err(err)
        }
    }
}

/// Async counterpart of [`TxHandle`].
#[async_trait]
pub trait AsyncTxHandle: Send {
    type Error: Display + Send;

    async fn commit(self) -> Result<(), Self::Error>;
    async fn rollback(self) -> Result<(), Self::Error>;
}

/// Async counterpart of [`BeginTx`].
#[async_trait]
pub trait AsyncBeginTx: Send {
    type Tx: AsyncTxHandle;

    async fn begin(self) -> Result<Self::Tx, <Self::Tx as AsyncTxHandle>::Error>;
}

/// Async counterpart of [`with_transaction`]. The body borrows the
/// transaction, so it returns a boxed future tied to that borrow.
pub async fn with_transaction_async<B, T, E, F>(conn: B, body: F) -> Result<T, E>
where
    B: AsyncBeginTx,
    E: From<<B::Tx as AsyncTxHandle>::Error>,
    F: for<'a> FnOnce(
        &'a mut B::Tx,
    ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>,
{
    let mut tx = conn.begin().await?;
    match body(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed after body error");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    struct FakeConn {
        log: Log,
    }

    struct FakeTx {
        log: Log,
        fail_rollback: bool,
    }

    impl TxHandle for FakeTx {
        type Error = String;

        fn commit(self) -> Result<(), String> {
            self.log.borrow_mut().push("commit");
            Ok(())
        }

        fn rollback(self) -> Result<(), String> {
            self.log.borrow_mut().push("rollback");
            if self.fail_rollback {
                Err("rollback refused".to_string())
            } else {
                Ok(())
            }
        }
    }

    impl BeginTx for FakeConn {
        type Tx = FakeTx;

        fn begin(self) -> Result<FakeTx, String> {
            self.log.borrow_mut().push("begin");
            Ok(FakeTx {
                log: self.log,
                fail_rollback: false,
            })
        }
    }

    #[test]
    fn commits_on_success() {
        let log: Log = Rc::default();
        let conn = FakeConn { log: log.clone() };
        let out: Result<i32, String> = with_transaction(conn, |_tx| Ok(7));
        assert_eq!(out, Ok(7));
        assert_eq!(*log.borrow(), vec!["begin", "commit"]);
    }

    #[test]
    fn rolls_back_and_keeps_body_error() {
        let log: Log = Rc::default();
        let conn = FakeConn { log: log.clone() };
        let out: Result<i32, String> =
            with_transaction(conn, |_tx| Err("body failed".to_string()));
        assert_eq!(out, Err("body failed".to_string()));
        assert_eq!(*log.borrow(), vec!["begin", "rollback"]);
    }

    #[test]
    fn rollback_failure_does_not_mask_body_error() {
        struct FailingConn {
            log: Log,
        }
        impl BeginTx for FailingConn {
            type Tx = FakeTx;

            fn begin(self) -> Result<FakeTx, String> {
                self.log.borrow_mut().push("begin");
                Ok(FakeTx {
                    log: self.log,
                    fail_rollback: true,
                })
            }
        }

        let log: Log = Rc::default();
        let conn = FailingConn { log: log.clone() };
        let out: Result<i32, String> =
            with_transaction(conn, |_tx| Err("body failed".to_string()));
        assert_eq!(out, Err("body failed".to_string()));
        assert_eq!(*log.borrow(), vec!["begin", "rollback"]);
    }
}
