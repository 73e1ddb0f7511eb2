use crate::error::RelayError;
use intercom_core::{CallRole, PeerId};
use tokio::sync::oneshot;

/// Команды, поступающие в комнату от сигнального сервера (WebSocket).
#[derive(Debug)]
pub enum RoomCommand {
    /// Запрос на вход в комнату. Роль назначает сама комната.
    Join {
        peer_id: PeerId,
        ack: oneshot::Sender<Result<JoinAck, RelayError>>,
    },

    /// Сигнальное сообщение для второго участника комнаты.
    Forward { peer_id: PeerId, signal: CallSignal },

    /// Сигнал о разрыве WebSocket соединения участника.
    Disconnect { peer_id: PeerId },
}

/// Подтверждение входа: роль и признак того, что второй участник уже внутри.
#[derive(Debug, Clone, Copy)]
pub struct JoinAck {
    pub role: CallRole,
    pub peer_present: bool,
}

/// Полезная нагрузка пересылки. SDP и кандидаты для комнаты непрозрачны.
#[derive(Debug, Clone)]
pub enum CallSignal {
    Offer { sdp: String },
    Answer { sdp: String },
    Candidate { candidate: String },
    End,
}
