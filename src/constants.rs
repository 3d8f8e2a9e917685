use lazy_static::lazy_static;
use std::collections::HashMap;

pub const MAX_AGE: i64 = 150;
pub const MAX_STAY_DAYS: i64 = 365;

pub const DEFAULT_RECORD_LIMIT: usize = 100;
pub const MAX_RECORD_LIMIT: usize = 1000;

pub const SAMPLE_BATCH_SIZE: usize = 150;
pub const EXTRACTION_WINDOW_DAYS: i64 = 90;

/// Canonical sex values after normalization.
pub const SEX_MALE: &str = "Masculino";
pub const SEX_FEMALE: &str = "Femenino";

/// Discharge conditions counted as a favorable outcome.
pub const IMPROVED_CONDITIONS: [&str; 2] = ["Mejorado", "Alta médica"];
pub const DECEASED_CONDITION: &str = "Fallecido";

pub const AGE_BUCKET_UNDER_18: &str = "Menor de 18";
pub const AGE_BUCKET_18_30: &str = "18-30";
pub const AGE_BUCKET_31_50: &str = "31-50";
pub const AGE_BUCKET_51_70: &str = "51-70";
pub const AGE_BUCKET_OVER_70: &str = "Mayor de 70";
pub const AGE_BUCKET_UNKNOWN: &str = "No especificado";

pub const STAY_BUCKETS: [&str; 5] = [
    "1-7 días",
    "8-14 días",
    "15-21 días",
    "22-30 días",
    "Más de 30 días",
];

lazy_static! {
    pub static ref SEX_ALIASES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("M", SEX_MALE);
        m.insert("F", SEX_FEMALE);
        m.insert("MASCULINO", SEX_MALE);
        m.insert("FEMENINO", SEX_FEMALE);
        m.insert("MALE", SEX_MALE);
        m.insert("FEMALE", SEX_FEMALE);
        m
    };

    pub static ref MONTH_NAMES: HashMap<u32, &'static str> = {
        let mut m = HashMap::new();
        m.insert(1, "Enero");
        m.insert(2, "Febrero");
        m.insert(3, "Marzo");
        m.insert(4, "Abril");
        m.insert(5, "Mayo");
        m.insert(6, "Junio");
        m.insert(7, "Julio");
        m.insert(8, "Agosto");
        m.insert(9, "Septiembre");
        m.insert(10, "Octubre");
        m.insert(11, "Noviembre");
        m.insert(12, "Diciembre");
        m
    };

    pub static ref INSURERS: Vec<&'static str> = vec![
        "SURA EPS",
        "Nueva EPS",
        "Sanitas EPS",
        "Salud Total",
        "EPS Famisanar",
        "Comfenalco",
        "Coomeva EPS",
        "Medimás EPS",
        "Capital Salud EPS",
        "Particular/Prepagada",
    ];

    pub static ref DIAGNOSES: Vec<&'static str> = vec![
        "Quemadura térmica grado II en brazo",
        "Quemadura eléctrica múltiple",
        "Quemadura química en cara y cuello",
        "Quemadura por llama en tórax",
        "Quemadura por contacto en mano",
        "Quemadura por líquido caliente en pierna",
        "Quemadura solar severa",
        "Quemadura por explosión multiple",
        "Quemadura por fricción",
        "Síndrome de inhalación de humo",
    ];

    pub static ref WARDS: Vec<&'static str> = vec![
        "UCI Quemados",
        "Hospitalización General",
        "Cirugía Plástica",
        "Cuidados Intermedios",
    ];

    pub static ref CAUSES: Vec<&'static str> = vec![
        "Accidente doméstico",
        "Accidente laboral",
        "Accidente vehicular",
        "Agresión",
        "Intento suicidio",
        "Otros",
    ];

    pub static ref PATIENT_NAMES: Vec<&'static str> = vec![
        "María García López",
        "Juan Carlos Rodríguez",
        "Ana Sofía Martínez",
        "Carlos Alberto Sánchez",
        "Luz Elena Vargas",
        "Pedro Antonio Gómez",
        "Carmen Rosa Jiménez",
        "Miguel Ángel Torres",
        "Sandra Patricia López",
        "José Luis Hernández",
        "Gloria Inés Morales",
        "Roberto Carlos Díaz",
        "Patricia Elena Ruiz",
        "Fernando José Castro",
        "Claudia Marcela Silva",
    ];

    pub static ref PHYSICIANS: Vec<&'static str> = vec![
        "Dr. García",
        "Dra. Martínez",
        "Dr. López",
        "Dra. Rodríguez",
        "Dr. Sánchez",
    ];
}
