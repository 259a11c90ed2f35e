//! Reference values for synthetic records.

pub(super) const DEPARTMENTS: [&str; 6] = ["RH", "IT", "Finance", "Commercial", "Marketing", "Ops"];

pub(super) fn job_titles(department: &str) -> &'static [&'static str] {
    match department {
        "IT" => &["Dev", "Data Analyst", "DevOps"],
        "RH" => &["Chargé RH", "DRH"],
        "Finance" => &["Comptable", "DAF"],
        "Commercial" => &["Commercial", "Business Dev"],
        "Marketing" => &["Chef de Produit", "CMO"],
        "Ops" => &["Responsable Ops", "Chef de Projet"],
        _ => &["Employé"],
    }
}

pub(super) const DOCUMENT_TYPES: [&str; 4] = ["Contrat", "Avenant", "Fiche de Paie", "Certificat"];
pub(super) const WORKFLOW_TYPES: [&str; 4] = ["Congé", "Note de Frais", "Formation", "Augmentation"];

pub const APPLICATION_STATUSES: [&str; 6] =
    ["applied", "screening", "interview", "offer", "hired", "rejected"];
pub const DOCUMENT_STATUSES: [&str; 5] = ["draft", "pending", "signed", "archived", "expired"];
pub const WORKFLOW_STATUSES: [&str; 3] = ["pending", "approved", "rejected"];
pub(super) const POSTING_STATUSES: [&str; 2] = ["open", "closed"];

pub(super) const FIRST_NAMES: [&str; 16] = [
    "Camille", "Louis", "Chloe", "Hugo", "Manon", "Lucas", "Ines", "Jules", "Lea", "Arthur",
    "Sarah", "Nathan", "Emma", "Theo", "Julie", "Paul",
];
pub(super) const LAST_NAMES: [&str; 16] = [
    "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit", "Durand", "Leroy",
    "Moreau", "Simon", "Laurent", "Lefebvre", "Michel", "Garcia", "Fournier",
];
pub(super) const COMPANY_SUFFIXES: [&str; 4] = ["SA", "SARL", "SAS", "et Fils"];
pub(super) const CITIES: [&str; 8] = [
    "Paris", "Lyon", "Marseille", "Toulouse", "Nantes", "Lille", "Bordeaux", "Dakar",
];
pub(super) const COUNTRIES: [&str; 6] = [
    "France", "Belgique", "Suisse", "Sénégal", "Côte d'Ivoire", "Maroc",
];
