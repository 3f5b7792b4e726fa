use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sql_mapper::prelude::*;

type Log = Arc<Mutex<Vec<&'static str>>>;

struct Conn {
    log: Log,
}

struct Tx {
    log: Log,
}

impl TxHandle for Tx {
    type Error = String;

    fn commit(self) -> Result<(), String> {
        self.log.lock().unwrap().push("commit");
        Ok(())
    }

    fn rollback(self) -> Result<(), String> {
        self.log.lock().unwrap().push("rollback");
        Ok(())
    }
}

impl BeginTx for Conn {
    type Tx = Tx;

    fn begin(self) -> Result<Tx, String> {
        self.log.lock().unwrap().push("begin");
        Ok(Tx { log: self.log })
    }
}

#[test]
fn sync_scope_commits_on_success() {
    let log: Log = Log::default();
    let conn = Conn { log: log.clone() };
    let result: Result<&str, String> = with_transaction(conn, |_tx| Ok("done"));
    assert_eq!(result, Ok("done"));
    assert_eq!(*log.lock().unwrap(), vec!["begin", "commit"]);
}

#[test]
fn sync_scope_rolls_back_on_error() {
    let log: Log = Log::default();
    let conn = Conn { log: log.clone() };
    let result: Result<(), String> = with_transaction(conn, |_tx| Err("boom".to_string()));
    assert_eq!(result, Err("boom".to_string()));
    assert_eq!(*log.lock().unwrap(), vec!["begin", "rollback"]);
}

struct AsyncConn {
    log: Log,
}

struct AsyncTx {
    log: Log,
}

#[async_trait]
impl AsyncTxHandle for AsyncTx {
    type Error = String;

    async fn commit(self) -> Result<(), String> {
        self.log.lock().unwrap().push("commit");
        Ok(())
    }

    async fn rollback(self) -> Result<(), String> {
        self.log.lock().unwrap().push("rollback");
        Ok(())
    }
}

#[async_trait]
impl AsyncBeginTx for AsyncConn {
    type Tx = AsyncTx;

    async fn begin(self) -> Result<AsyncTx, String> {
        self.log.lock().unwrap().push("begin");
        Ok(AsyncTx { log: self.log })
    }
}

type BoxedBody<'a, T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send + 'a>>;

fn succeeding_body(_tx: &mut AsyncTx) -> BoxedBody<'_, i32> {
    Box::pin(async { Ok(5) })
}

fn failing_body(_tx: &mut AsyncTx) -> BoxedBody<'_, i32> {
    Box::pin(async { Err("late failure".to_string()) })
}

#[tokio::test]
async fn async_scope_commits_on_success() {
    let log: Log = Log::default();
    let conn = AsyncConn { log: log.clone() };
    let result = with_transaction_async(conn, succeeding_body).await;
    assert_eq!(result, Ok(5));
    assert_eq!(*log.lock().unwrap(), vec!["begin", "commit"]);
}

#[tokio::test]
async fn async_scope_rolls_back_on_error() {
    let log: Log = Log::default();
    let conn = AsyncConn { log: log.clone() };
    let result = with_transaction_async(conn, failing_body).await;
    assert_eq!(result, Err("late failure".to_string()));
    assert_eq!(*log.lock().unwrap(), vec!["begin", "rollback"]);
}
