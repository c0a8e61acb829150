use std::sync::Arc;

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::Rng;

use chat_directory::{chat_store::LocalChatStore, GatewayHandle};

async fn setup_friends(gateway: &GatewayHandle) -> (Address, Address) {
    let alice = PrivateKeySigner::random().address();
    let bob = PrivateKeySigner::random().address();
    gateway
        .create_account(alice, "alice")
        .await
        .expect("Failed to create account");
    gateway
        .create_account(bob, "bob")
        .await
        .expect("Failed to create account");
    gateway
        .add_friend(alice, bob, "bob")
        .await
        .expect("Failed to add friend");
    (alice, bob)
}

fn send_message_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    for n in [1, 10, 100, 1000] {
        let gateway = rt.block_on(async {
            GatewayHandle::spawn(Arc::new(LocalChatStore::new()), 1024)
        });
        let (alice, bob) = rt.block_on(setup_friends(&gateway));
        c.bench_function(format!("send_message_benchmark_{}", n).as_str(), |b| {
            b.iter_custom(|iters| {
                rt.block_on(async {
                    let mut total_duration = std::time::Duration::ZERO;

                    for _ in 0..iters {
                        let content = rand::thread_rng().gen::<u64>().to_string();
                        let start = std::time::Instant::now();
                        for _ in 0..n {
                            gateway
                                .send_message(alice, bob, &content)
                                .await
                                .expect("Failed to send message");
                        }
                        total_duration += start.elapsed();
                    }

                    total_duration
                })
            })
        });
        rt.block_on(gateway.shutdown());
    }
}

fn create_account_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    for n in [1, 10, 100, 1000] {
        c.bench_function(format!("create_account_benchmark_{}", n).as_str(), |b| {
            b.iter_custom(|iters| {
                rt.block_on(async {
                    let mut total_duration = std::time::Duration::ZERO;

                    for _ in 0..iters {
                        // Setup phase: fresh gateway and identities
                        let gateway = GatewayHandle::spawn(Arc::new(LocalChatStore::new()), 16);
                        let identities: Vec<Address> = (0..n)
                            .map(|_| PrivateKeySigner::random().address())
                            .collect();

                        let start = std::time::Instant::now();
                        let registered = futures::future::join_all(
                            identities
                                .iter()
                                .map(|identity| gateway.create_account(*identity, "user")),
                        )
                        .await
                        .into_iter()
                        .all(|result| result.is_ok());
                        total_duration += start.elapsed();
                        assert!(registered, "Failed to create accounts");
                        gateway.shutdown().await;
                    }

                    total_duration
                })
            })
        });
    }
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = send_message_benchmark, create_account_benchmark
);
criterion_main!(benches);
