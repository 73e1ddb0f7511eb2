use async_trait::async_trait;
use intercom_core::{PeerId, ServerEvent};

/// Трейт доставки: комната отдаёт события конкретному участнику, не зная,
/// каким транспортом он подключён. В тестах подменяется моком.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Отправить событие конкретному участнику.
    async fn send_event(&self, peer_id: PeerId, event: ServerEvent);
}
