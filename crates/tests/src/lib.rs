//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 → 分发器 → 处理器 的完整链路
//! - 批次划分与顺序性质
//! - 多生产者经 DispatcherHandle 串行化

#[cfg(test)]
mod contract_tests {
    use contracts::{Task, TaskKind};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_task_json_shape() {
        let task = Task::new("resize", serde_json::json!({"w": 10}));
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "resize", "payload": {"w": 10}}));
    }

    #[test]
    fn test_sentinel_kind() {
        assert!(TaskKind::from("QUIT").is_sentinel());
        assert!(!TaskKind::from("quitting").is_sentinel());
    }
}

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};

    use contracts::{BatchProcessor, Task};
    use dispatcher::{Dispatcher, FnProcessor};

    pub type Batches = Arc<Mutex<Vec<Vec<Task>>>>;

    /// Dispatcher whose processor records every batch it receives
    pub fn recording_dispatcher(
        capacity: usize,
    ) -> (Dispatcher<impl BatchProcessor + 'static>, Batches) {
        let batches: Batches = Arc::default();
        let sink = Arc::clone(&batches);
        let processor = FnProcessor::new("recorder", move |batch: Vec<Task>| {
            sink.lock().unwrap().push(batch);
            Ok(())
        });
        (Dispatcher::new(capacity, processor).unwrap(), batches)
    }

    pub fn kinds(batches: &Batches) -> Vec<Vec<String>> {
        batches
            .lock()
            .unwrap()
            .iter()
            .map(|batch| batch.iter().map(|t| t.kind().to_string()).collect())
            .collect()
    }

    pub fn numbered(n: usize) -> Vec<Task> {
        (1..=n).map(|i| Task::new(format!("T{i}"), i)).collect()
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::support::*;
    use contracts::Task;
    use dispatcher::{Ack, DispatcherError, DispatcherState};

    /// capacity = 2: T1..T5 + quit → [T1,T2] [T3,T4] [T5]
    #[tokio::test]
    async fn test_five_tasks_three_batches() {
        let (mut dispatcher, batches) = recording_dispatcher(2);
        for task in numbered(5) {
            dispatcher.submit(task).await.unwrap();
        }
        let ack = dispatcher.submit(Task::quit()).await.unwrap();

        assert_eq!(ack, Ack::Completed { final_batch: 1 });
        assert_eq!(
            kinds(&batches),
            vec![vec!["T1", "T2"], vec!["T3", "T4"], vec!["T5"]]
        );
    }

    /// capacity = 2: T1, T2 + quit → 只有一次调用，没有空批次
    #[tokio::test]
    async fn test_sentinel_after_full_batch_adds_no_empty_flush() {
        let (mut dispatcher, batches) = recording_dispatcher(2);
        dispatcher.submit(Task::new("T1", 1)).await.unwrap();
        let ack = dispatcher.submit(Task::new("T2", 2)).await.unwrap();
        assert_eq!(ack, Ack::Flushed { batch_len: 2 });

        let ack = dispatcher.submit(Task::quit()).await.unwrap();
        assert_eq!(ack, Ack::Completed { final_batch: 0 });
        assert_eq!(kinds(&batches), vec![vec!["T1", "T2"]]);
    }

    /// 立即提交 quit → 处理器从不被调用
    #[tokio::test]
    async fn test_immediate_sentinel() {
        let (mut dispatcher, batches) = recording_dispatcher(2);
        let ack = dispatcher.submit(Task::quit()).await.unwrap();

        assert!(ack.is_completed());
        assert_eq!(dispatcher.state(), DispatcherState::Terminated);
        assert!(batches.lock().unwrap().is_empty());
    }

    /// 非法输入 → InvalidTask，缓冲区保持为空
    #[tokio::test]
    async fn test_string_rejected_before_buffering() {
        let (mut dispatcher, batches) = recording_dispatcher(2);
        let err = dispatcher.submit("not a task").await.unwrap_err();

        match err {
            DispatcherError::InvalidTask { found } => assert_eq!(found, "string"),
            other => panic!("expected InvalidTask, got {other:?}"),
        }
        assert_eq!(dispatcher.pending(), 0);
        assert!(batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_after_termination() {
        let (mut dispatcher, batches) = recording_dispatcher(3);
        dispatcher.submit(Task::new("a", 1)).await.unwrap();
        dispatcher.submit(Task::quit()).await.unwrap();

        let err = dispatcher.submit(Task::new("late", 2)).await.unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::StreamClosed {
                state: DispatcherState::Terminated
            }
        ));
        let err = dispatcher.submit(Task::quit()).await.unwrap_err();
        assert!(matches!(err, DispatcherError::StreamClosed { .. }));
        assert_eq!(kinds(&batches), vec![vec!["a"]]);
    }
}

#[cfg(test)]
mod property_tests {
    use super::support::*;
    use contracts::Task;

    /// N 个合法任务 + quit，容量 C → ceil(N / C) 次调用，顺序保持
    #[tokio::test]
    async fn test_batch_count_and_order_grid() {
        for capacity in 1..=5usize {
            for n in 0..=12usize {
                let (mut dispatcher, batches) = recording_dispatcher(capacity);
                for task in numbered(n) {
                    dispatcher.submit(task).await.unwrap();
                }
                dispatcher.submit(Task::quit()).await.unwrap();

                let batches = batches.lock().unwrap();
                assert_eq!(
                    batches.len(),
                    n.div_ceil(capacity),
                    "capacity={capacity} n={n}"
                );

                let (last, full) = match batches.split_last() {
                    Some(split) => split,
                    None => continue,
                };
                assert!(full.iter().all(|b| b.len() == capacity));
                assert!(!last.is_empty() && last.len() <= capacity);

                let flattened: Vec<String> = batches
                    .iter()
                    .flatten()
                    .map(|t| t.kind().to_string())
                    .collect();
                let expected: Vec<String> = (1..=n).map(|i| format!("T{i}")).collect();
                assert_eq!(flattened, expected, "capacity={capacity} n={n}");
            }
        }
    }
}

#[cfg(test)]
mod policy_tests {
    use super::support::*;
    use contracts::{Task, ValidationPolicy};
    use dispatcher::{DispatcherError, DispatcherState};
    use serde_json::json;

    #[tokio::test]
    async fn test_abort_strands_buffer() {
        let (dispatcher, batches) = recording_dispatcher(3);
        let mut dispatcher = dispatcher.with_policy(ValidationPolicy::Abort);

        dispatcher.submit(Task::new("a", 1)).await.unwrap();
        dispatcher.submit(Task::new("b", 2)).await.unwrap();
        assert!(dispatcher.submit(json!([1, 2])).await.is_err());
        assert_eq!(dispatcher.state(), DispatcherState::Aborted);

        let err = dispatcher.submit(Task::quit()).await.unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::StreamClosed {
                state: DispatcherState::Aborted
            }
        ));

        let undelivered = dispatcher.take_undelivered();
        assert_eq!(undelivered.len(), 2);
        assert!(batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_skip_continues_stream() {
        let (dispatcher, batches) = recording_dispatcher(2);
        let mut dispatcher = dispatcher.with_policy(ValidationPolicy::Skip);

        dispatcher.submit(Task::new("a", 1)).await.unwrap();
        assert!(dispatcher.submit(json!({"payload": 5})).await.is_err());
        assert!(dispatcher.submit(json!({"kind": ""})).await.is_err());
        dispatcher.submit(json!({"kind": "b", "payload": 2})).await.unwrap();
        dispatcher.submit(json!({"kind": "Quit"})).await.unwrap();

        assert_eq!(dispatcher.state(), DispatcherState::Terminated);
        assert_eq!(dispatcher.metrics().rejected(), 2);
        assert_eq!(kinds(&batches), vec![vec!["a", "b"]]);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashSet;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, Task};
    use dispatcher::{
        create_dispatcher, Ack, Dispatcher, DispatcherHandle, DispatcherState, FnProcessor,
        PerTaskProcessor,
    };
    use serde_json::Value;
    use tempfile::tempdir;

    /// End-to-end: TOML 配置 → create_dispatcher → FileProcessor
    #[tokio::test]
    async fn test_file_pipeline_from_config() {
        observability::init_for_tests();
        let dir = tempdir().unwrap();
        let out = dir.path().join("batches");
        let toml = format!(
            r#"
[dispatcher]
capacity = 2

[processor]
name = "archive"
processor_type = "file"
params = {{ base_path = "{}" }}
"#,
            out.display()
        );

        let mut config_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        config_file.write_all(toml.as_bytes()).unwrap();
        let config = ConfigLoader::load_from_path(config_file.path()).unwrap();

        let mut dispatcher = create_dispatcher(&config).unwrap();
        for i in 1..=5 {
            dispatcher.submit(Task::new(format!("T{i}"), i)).await.unwrap();
        }
        dispatcher.submit(Task::quit()).await.unwrap();

        let mut files: Vec<_> = std::fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        assert_eq!(files.len(), 3);

        let last: Value =
            serde_json::from_str(&std::fs::read_to_string(&files[2]).unwrap()).unwrap();
        assert_eq!(last["size"], 1);
        assert_eq!(last["tasks"][0]["kind"], "T5");
    }

    #[tokio::test]
    async fn test_log_pipeline_from_json_config() {
        observability::init_for_tests();
        let config = ConfigLoader::load_from_str(
            r#"{
                "dispatcher": { "capacity": 3, "validation_policy": "skip" },
                "processor": { "name": "console", "processor_type": "log" }
            }"#,
            ConfigFormat::Json,
        )
        .unwrap();

        let mut dispatcher = create_dispatcher(&config).unwrap();
        for i in 0..7 {
            dispatcher.submit(Task::new("job", i)).await.unwrap();
        }
        assert!(dispatcher.submit(Value::Null).await.is_err());
        let ack = dispatcher.submit(Task::quit()).await.unwrap();

        assert_eq!(ack, Ack::Completed { final_batch: 1 });
        let stats = dispatcher.metrics().snapshot();
        assert_eq!(stats.batches, 3);
        assert_eq!(stats.delivered, 7);
        assert_eq!(stats.rejected, 1);
    }

    /// 多个生产者经同一个 handle 提交，每个任务恰好投递一次
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_handle_serializes_producers() {
        let seen = Arc::new(Mutex::new(Vec::<(usize, String)>::new()));
        let sink = Arc::clone(&seen);
        let processor = FnProcessor::new("collector", move |batch: Vec<Task>| {
            let len = batch.len();
            let mut seen = sink.lock().unwrap();
            seen.extend(batch.into_iter().map(|t| (len, t.kind().to_string())));
            Ok(())
        });
        let handle = DispatcherHandle::spawn(Dispatcher::new(4, processor).unwrap(), 8);

        let mut producers = Vec::new();
        for p in 0..4 {
            let submitter = handle.submitter();
            producers.push(tokio::spawn(async move {
                for i in 0..25 {
                    submitter
                        .submit(Task::new(format!("p{p}-{i}"), i))
                        .await
                        .unwrap();
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }

        let ack = handle.submit(Task::quit()).await.unwrap();
        assert_eq!(ack, Ack::Completed { final_batch: 0 });

        let dispatcher = handle.shutdown().await.unwrap();
        assert_eq!(dispatcher.state(), DispatcherState::Terminated);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 100);
        assert!(seen.iter().all(|(len, _)| *len == 4));
        let unique: HashSet<_> = seen.iter().map(|(_, kind)| kind.clone()).collect();
        assert_eq!(unique.len(), 100);

        // 每个生产者自身的顺序保持不变
        for p in 0..4 {
            let prefix = format!("p{p}-");
            let order: Vec<usize> = seen
                .iter()
                .filter_map(|(_, kind)| kind.strip_prefix(&prefix))
                .map(|i| i.parse().unwrap())
                .collect();
            assert_eq!(order, (0..25).collect::<Vec<_>>());
        }
    }

    /// 逐任务处理器：10 个任务，容量 2
    #[tokio::test]
    async fn test_per_task_processor_pipeline() {
        let handled = Arc::new(Mutex::new(Vec::<Value>::new()));
        let sink = Arc::clone(&handled);
        let processor = PerTaskProcessor::new("printer", move |task: Task| {
            sink.lock().unwrap().push(task.payload().clone());
            Ok(())
        });

        let mut dispatcher = Dispatcher::new(2, processor).unwrap();
        for i in 1..=10 {
            dispatcher.submit(Task::new(format!("Task{i}"), i)).await.unwrap();
        }
        dispatcher.submit(Task::quit()).await.unwrap();

        let handled = handled.lock().unwrap();
        let expected: Vec<Value> = (1..=10).map(Value::from).collect();
        assert_eq!(*handled, expected);
        assert_eq!(dispatcher.metrics().batches(), 5);
    }

    #[tokio::test]
    async fn test_processor_failure_surfaces_and_stream_continues() {
        let mut calls = 0;
        let processor = FnProcessor::new("flaky", move |batch: Vec<Task>| {
            calls += 1;
            if calls == 1 {
                return Err(ContractError::processor_failed("flaky", batch.len(), "disk full"));
            }
            Ok(())
        });

        let mut dispatcher = Dispatcher::new(2, processor).unwrap();
        dispatcher.submit(Task::new("a", 1)).await.unwrap();
        let err = dispatcher.submit(Task::new("b", 2)).await.unwrap_err();
        assert!(err.is_processor_error());
        assert!(err.to_string().contains("disk full"));

        assert_eq!(dispatcher.state(), DispatcherState::Accepting);
        assert_eq!(dispatcher.pending(), 0);

        dispatcher.submit(Task::new("c", 3)).await.unwrap();
        let ack = dispatcher.submit(Task::quit()).await.unwrap();
        assert_eq!(ack, Ack::Completed { final_batch: 1 });
        assert_eq!(dispatcher.metrics().processor_failures(), 1);
    }
}
