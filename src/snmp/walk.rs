use super::oid::{is_descendant, parse_arcs};
use super::{DeviceClient, SnmpError, VarBind, VarBindError};

/// Потоковый обход поддерева через GETBULK.
///
/// Каждый вызов `next_batch` делает один запрос к агенту и сразу отдает
/// полученную страницу. Обход конечен и не перезапускается: после
/// завершения или ошибки всегда возвращается `None`.
pub struct Walk<'c> {
    client: &'c mut dyn DeviceClient,
    root: Vec<u64>,
    cursor: String,
    last: Vec<u64>,
    max_repetitions: u32,
    pending_error: Option<SnmpError>,
    done: bool,
}

impl<'c> Walk<'c> {
    pub fn new(
        client: &'c mut dyn DeviceClient,
        root: &str,
        max_repetitions: u32,
    ) -> Result<Self, SnmpError> {
        let root_arcs = parse_arcs(root)?;

        Ok(Self {
            client,
            last: root_arcs.clone(),
            root: root_arcs,
            cursor: root.trim().to_string(),
            max_repetitions: max_repetitions.max(1),
            pending_error: None,
            done: false,
        })
    }

    pub async fn next_batch(&mut self) -> Option<Result<Vec<VarBind>, SnmpError>> {
        if let Some(err) = self.pending_error.take() {
            return Some(Err(err));
        }
        if self.done {
            return None;
        }

        let resp = match self
            .client
            .get_bulk(&self.cursor, self.max_repetitions)
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if resp.is_empty() {
            self.done = true;
            return None;
        }

        let mut batch = Vec::with_capacity(resp.len());
        for varbind in resp {
            if varbind.value == Err(VarBindError::EndOfMibView) {
                self.done = true;
                break;
            }

            let arcs = match parse_arcs(&varbind.oid) {
                Ok(arcs) => arcs,
                Err(e) => {
                    self.fail(e);
                    break;
                }
            };

            // Вышли за пределы таблицы
            if !is_descendant(&arcs, &self.root) {
                self.done = true;
                break;
            }

            if arcs <= self.last {
                let err = SnmpError::NotIncreasing {
                    target: self.client.target().to_string(),
                    oid: varbind.oid.clone(),
                };
                self.fail(err);
                break;
            }

            self.last = arcs;
            self.cursor = varbind.oid.clone();
            batch.push(varbind);
        }

        if batch.is_empty() {
            self.done = true;
            return self.pending_error.take().map(Err);
        }

        Some(Ok(batch))
    }

    fn fail(&mut self, err: SnmpError) {
        self.done = true;
        self.pending_error = Some(err);
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::{DeviceScript, Reply, ScriptedClient};
    use super::*;

    fn leaf(column: u32, index: u32, value: &str) -> VarBind {
        VarBind::ok(format!("1.3.6.1.4.1.2021.9.1.{}.{}", column, index), value)
    }

    async fn drain(walk: &mut Walk<'_>) -> (Vec<Vec<VarBind>>, Option<SnmpError>) {
        let mut batches = Vec::new();
        let mut error = None;
        while let Some(item) = walk.next_batch().await {
            match item {
                Ok(batch) => batches.push(batch),
                Err(e) => error = Some(e),
            }
        }
        (batches, error)
    }

    #[tokio::test]
    async fn yields_one_batch_per_round_trip_and_stops_outside_subtree() {
        let mut client = ScriptedClient::new(
            "10.0.0.1",
            DeviceScript::default().with_bulk(vec![
                Reply::Ok(vec![leaf(1, 1, "1"), leaf(2, 1, "/")]),
                Reply::Ok(vec![
                    leaf(6, 1, "1000"),
                    VarBind::ok("1.3.6.1.4.1.2021.10.1.1.1", "1"),
                ]),
            ]),
        );

        let mut walk = Walk::new(&mut client, "1.3.6.1.4.1.2021.9.1", 2).unwrap();
        let (batches, error) = drain(&mut walk).await;

        assert!(error.is_none());
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[1], vec![leaf(6, 1, "1000")]);
        assert!(walk.next_batch().await.is_none());
        assert_eq!(
            client.requests(),
            vec![
                "10.0.0.1 bulk 1.3.6.1.4.1.2021.9.1".to_string(),
                "10.0.0.1 bulk 1.3.6.1.4.1.2021.9.1.2.1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn error_after_streamed_batches_is_reported_last() {
        let mut client = ScriptedClient::new(
            "10.0.0.1",
            DeviceScript::default().with_bulk(vec![
                Reply::Ok(vec![leaf(2, 1, "/")]),
                Reply::Fail,
            ]),
        );

        let mut walk = Walk::new(&mut client, "1.3.6.1.4.1.2021.9.1", 20).unwrap();
        let (batches, error) = drain(&mut walk).await;

        assert_eq!(batches.len(), 1);
        assert!(matches!(error, Some(SnmpError::Transport { .. })));
    }

    #[tokio::test]
    async fn end_of_mib_view_terminates() {
        let mut client = ScriptedClient::new(
            "10.0.0.1",
            DeviceScript::default().with_bulk(vec![Reply::Ok(vec![
                leaf(2, 1, "/"),
                VarBind::error("1.3.6.1.4.1.2021.9.1.2.1", VarBindError::EndOfMibView),
            ])]),
        );

        let mut walk = Walk::new(&mut client, "1.3.6.1.4.1.2021.9.1", 20).unwrap();
        let (batches, error) = drain(&mut walk).await;

        assert_eq!(batches, vec![vec![leaf(2, 1, "/")]]);
        assert!(error.is_none());
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn non_increasing_oid_keeps_streamed_entries() {
        let mut client = ScriptedClient::new(
            "10.0.0.1",
            DeviceScript::default().with_bulk(vec![Reply::Ok(vec![
                leaf(2, 1, "/"),
                leaf(2, 2, "/home"),
                leaf(2, 1, "/"),
            ])]),
        );

        let mut walk = Walk::new(&mut client, "1.3.6.1.4.1.2021.9.1", 20).unwrap();
        let (batches, error) = drain(&mut walk).await;

        assert_eq!(batches, vec![vec![leaf(2, 1, "/"), leaf(2, 2, "/home")]]);
        assert!(matches!(error, Some(SnmpError::NotIncreasing { .. })));
    }
}
