//! Отправка синтетических пакетов
//!
//! Драйвер передаёт каждому событию размер пакета; что делать с ним дальше,
//! решает реализация [`PacketSink`].

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::class::TrafficClass;
use crate::error::{Result, SimError};

/// Алфавит полезной нагрузки (строчные латинские буквы без `q`)
pub const PAYLOAD_ALPHABET: &[u8; 25] = b"abcdefghijklmnoprstuvzxyw";

/// Наибольшая полезная нагрузка UDP поверх IPv4
pub const MAX_UDP_PAYLOAD: usize = 65507;

/// Способ передачи пакетов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// UDP датаграммы на адрес назначения
    Udp,
    /// Только журналирование
    DryRun,
    /// Сырые IP пакеты (не поддерживается)
    RawIp,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Udp => write!(f, "udp"),
            TransportMode::DryRun => write!(f, "dry_run"),
            TransportMode::RawIp => write!(f, "raw_ip"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "udp" => Ok(TransportMode::Udp),
            "dry_run" | "dry-run" => Ok(TransportMode::DryRun),
            "raw_ip" | "raw-ip" => Ok(TransportMode::RawIp),
            unknown => Err(format!("Неизвестный режим передачи: {}", unknown)),
        }
    }
}

/// Получатель синтетических пакетов
#[async_trait]
pub trait PacketSink: Send {
    /// Передать пакет размера `size` для класса `class`
    async fn transmit(&mut self, class: TrafficClass, size: i64) -> Result<()>;
}

#[async_trait]
impl<S: PacketSink + ?Sized> PacketSink for Box<S> {
    async fn transmit(&mut self, class: TrafficClass, size: i64) -> Result<()> {
        (**self).transmit(class, size).await
    }
}

/// Полезная нагрузка из `size` случайных букв алфавита
///
/// Отрицательный размер даёт пустую нагрузку.
pub fn build_payload<R: Rng + ?Sized>(size: i64, rng: &mut R) -> Bytes {
    let len = usize::try_from(size).unwrap_or(0);
    let mut payload = BytesMut::with_capacity(len);
    for _ in 0..len {
        payload.put_u8(PAYLOAD_ALPHABET[rng.gen_range(0..PAYLOAD_ALPHABET.len())]);
    }
    payload.freeze()
}

/// Отправка UDP датаграмм
pub struct UdpSink {
    socket: UdpSocket,
    destination: SocketAddr,
    rng: StdRng,
}

impl UdpSink {
    /// Открыть сокет для отправки на `destination`
    pub async fn bind(destination: SocketAddr) -> Result<Self> {
        let local: SocketAddr = if destination.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        info!("UDP отправка на {} с {}", destination, socket.local_addr()?);

        Ok(Self {
            socket,
            destination,
            rng: StdRng::from_entropy(),
        })
    }

    /// Адрес назначения
    pub fn destination(&self) -> SocketAddr {
        self.destination
    }
}

#[async_trait]
impl PacketSink for UdpSink {
    async fn transmit(&mut self, class: TrafficClass, size: i64) -> Result<()> {
        let mut payload = build_payload(size, &mut self.rng);
        if payload.len() > MAX_UDP_PAYLOAD {
            debug!(
                "Пакет {} байт не помещается в датаграмму, отправлено {}",
                payload.len(),
                MAX_UDP_PAYLOAD
            );
            payload.truncate(MAX_UDP_PAYLOAD);
        }
        let sent = self
            .socket
            .send_to(&payload, self.destination)
            .await
            .map_err(SimError::Transmit)?;
        debug!("{}: отправлено {} байт на {}", class, sent, self.destination);
        Ok(())
    }
}

/// Режим без отправки: пакеты только учитываются
#[derive(Debug, Default)]
pub struct DryRunSink {
    packets: u64,
    bytes: u64,
}

impl DryRunSink {
    /// Создать пустой счётчик
    pub fn new() -> Self {
        Self::default()
    }

    /// Сколько пакетов было бы отправлено
    pub fn packets(&self) -> u64 {
        self.packets
    }

    /// Сколько байт было бы отправлено
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

#[async_trait]
impl PacketSink for DryRunSink {
    async fn transmit(&mut self, class: TrafficClass, size: i64) -> Result<()> {
        self.packets += 1;
        self.bytes += u64::try_from(size).unwrap_or(0);
        debug!("{}: пакет {} байт (без отправки)", class, size);
        Ok(())
    }
}

/// Сохраняет все пакеты для последующей проверки
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Vec<(TrafficClass, i64)>,
}

impl RecordingSink {
    /// Создать пустой журнал
    pub fn new() -> Self {
        Self::default()
    }

    /// Отправленные пакеты в порядке отправки
    pub fn sent(&self) -> &[(TrafficClass, i64)] {
        &self.sent
    }
}

#[async_trait]
impl PacketSink for RecordingSink {
    async fn transmit(&mut self, class: TrafficClass, size: i64) -> Result<()> {
        self.sent.push((class, size));
        Ok(())
    }
}
