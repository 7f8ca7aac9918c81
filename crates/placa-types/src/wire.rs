//! Outward projection of a detection record
//!
//! Downstream consumers of the management API expect the Portuguese field
//! names below; they are a stable contract independent of the internal
//! record layout.

use serde::{Deserialize, Serialize};

use crate::record::{DetectionStatus, PlateDetectionRecord};

/// Validation status as published on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusValidacao {
    #[serde(rename = "VALIDADA")]
    Validada,
    #[serde(rename = "PENDENTE")]
    Pendente,
    #[serde(rename = "ERRO")]
    Erro,
}

impl From<DetectionStatus> for StatusValidacao {
    fn from(status: DetectionStatus) -> Self {
        match status {
            DetectionStatus::Validated => StatusValidacao::Validada,
            DetectionStatus::Pending => StatusValidacao::Pendente,
            DetectionStatus::Rejected | DetectionStatus::EngineFailure => StatusValidacao::Erro,
        }
    }
}

/// Plate region rectangle on the wire
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordenadas {
    pub x: u32,
    pub y: u32,
    pub largura: u32,
    pub altura: u32,
}

/// Stable outward field set for one detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionDto {
    #[serde(default)]
    pub placa: Option<String>,

    /// Engine confidence, 0.0-1.0
    #[serde(default)]
    pub confianca: Option<f64>,

    #[serde(rename = "dataHoraDetecao")]
    pub data_hora_detecao: chrono::DateTime<chrono::Utc>,

    #[serde(rename = "statusValidacao")]
    pub status_validacao: StatusValidacao,

    #[serde(rename = "tipoErro", default)]
    pub tipo_erro: Option<String>,

    /// Processing time in milliseconds
    #[serde(rename = "tempoProcessamento")]
    pub tempo_processamento: u64,

    #[serde(default)]
    pub coordenadas: Option<Coordenadas>,

    /// Frame quality, 0.0-1.0
    #[serde(rename = "qualidadeImagem", default)]
    pub qualidade_imagem: Option<f64>,
}

impl From<&PlateDetectionRecord> for DetectionDto {
    fn from(record: &PlateDetectionRecord) -> Self {
        Self {
            placa: record.plate.clone(),
            confianca: record.confidence,
            data_hora_detecao: record.detected_at,
            status_validacao: record.status.into(),
            tipo_erro: record.error_kind.map(|k| k.label().to_string()),
            tempo_processamento: record.processing_time_ms,
            coordenadas: record.bounding_box.map(|b| Coordenadas {
                x: b.x,
                y: b.y,
                largura: b.width,
                altura: b.height,
            }),
            qualidade_imagem: record.image_quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CaptureMeta, DetectionErrorKind};
    use chrono::Utc;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StatusValidacao::from(DetectionStatus::Validated),
            StatusValidacao::Validada
        );
        assert_eq!(
            StatusValidacao::from(DetectionStatus::Pending),
            StatusValidacao::Pendente
        );
        assert_eq!(
            StatusValidacao::from(DetectionStatus::Rejected),
            StatusValidacao::Erro
        );
        assert_eq!(
            StatusValidacao::from(DetectionStatus::EngineFailure),
            StatusValidacao::Erro
        );
    }

    #[test]
    fn test_dto_field_names() {
        let mut record = PlateDetectionRecord::from_meta(&CaptureMeta::default(), Utc::now());
        record.plate = Some("ABC1D23".to_string());
        record.confidence = Some(0.91);
        record.status = DetectionStatus::Validated;
        record.processing_time_ms = 120;

        let dto = DetectionDto::from(&record);
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["placa"], "ABC1D23");
        assert_eq!(json["statusValidacao"], "VALIDADA");
        assert_eq!(json["tempoProcessamento"], 120);
        assert!(json.get("plate").is_none());
    }

    #[test]
    fn test_error_kind_on_wire() {
        let mut record = PlateDetectionRecord::from_meta(&CaptureMeta::default(), Utc::now());
        record.status = DetectionStatus::Rejected;
        record.error_kind = Some(DetectionErrorKind::NoPlateFound);

        let dto = DetectionDto::from(&record);
        assert_eq!(dto.tipo_erro.as_deref(), Some("NO_PLATE_FOUND"));
        assert_eq!(dto.status_validacao, StatusValidacao::Erro);
    }
}
