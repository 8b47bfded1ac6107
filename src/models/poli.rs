use serde::{Deserialize, Serialize};

/// Specialty/department label (Indonesian clinical term), used as the
/// grouping key for booking and for the admin per-poli statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Poli {
    pub name: String,
    pub description: String,
}

impl Poli {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Seeded fallback list, served whenever the `polis` collection is
/// empty or unreachable.
pub fn default_polis() -> Vec<Poli> {
    vec![
        Poli::new("Gigi / Oral", "Perawatan gigi, gusi, dan mulut."),
        Poli::new("Mata", "Kesehatan mata dan penglihatan."),
        Poli::new("Otak (Neurologi)", "Gangguan sistem saraf dan otak."),
        Poli::new("Tulang (Ortopedi)", "Cedera dan penyakit tulang serta sendi."),
        Poli::new("Radiologi", "Diagnosis menggunakan pencitraan medis."),
        Poli::new("Nutrisi", "Konsultasi diet dan gizi."),
        Poli::new("THT", "Telinga, Hidung, dan Tenggorokan."),
        Poli::new("Penyakit Dalam", "Penyakit pada organ dalam dewasa."),
        Poli::new("Anak (Pediatri)", "Kesehatan bayi, anak, dan remaja."),
        Poli::new("Kulit & Kelamin", "Masalah kulit, rambut, kuku, dan seksual."),
        Poli::new("Jantung & Pembuluh Darah", "Kesehatan jantung dan sistem peredaran darah."),
        Poli::new("Kandungan & Kebidanan", "Kesehatan reproduksi wanita dan kehamilan."),
    ]
}
