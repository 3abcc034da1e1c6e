// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[tokio::test]
async fn same_name_waits_for_release() {
    let locks = ContainerLocks::new();
    let guard = locks.acquire("web").await;

    let waiter = {
        let locks = locks.clone();
        tokio::spawn(async move {
            let _guard = locks.acquire("web").await;
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    drop(guard);
    tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
}

#[tokio::test]
async fn different_names_do_not_block() {
    let locks = ContainerLocks::new();
    let _web = locks.acquire("web").await;

    let db = tokio::time::timeout(Duration::from_millis(100), locks.acquire("db")).await;
    assert!(db.is_ok());
}
