//! Seeded synthetic HR records for development stores.

mod catalog;

use chrono::{DateTime, Duration, Utc};
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::store::{CollectionWriter, StoreError, TRACKED_COLLECTIONS};

pub use catalog::{APPLICATION_STATUSES, DOCUMENT_STATUSES, WORKFLOW_STATUSES};

pub const DEFAULT_SEED: u64 = 42;

/// Upper bounds (and company count) for generated volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureProfile {
    pub companies: usize,
    pub max_employees_per_company: usize,
    pub max_job_postings: usize,
    pub max_applications: usize,
    pub max_documents: usize,
    pub payroll_months: usize,
    pub max_reviews: usize,
    pub max_workflows: usize,
}

impl Default for FixtureProfile {
    fn default() -> Self {
        Self {
            companies: 10,
            max_employees_per_company: 50,
            max_job_postings: 5,
            max_applications: 15,
            max_documents: 10,
            payroll_months: 6,
            max_reviews: 3,
            max_workflows: 5,
        }
    }
}

/// Generated documents keyed by collection, in [`TRACKED_COLLECTIONS`] order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureSet {
    collections: Vec<(&'static str, Vec<Document>)>,
}

impl FixtureSet {
    pub fn get(&self, collection: &str) -> &[Document] {
        self.collections
            .iter()
            .find(|(name, _)| *name == collection)
            .map(|(_, documents)| documents.as_slice())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[Document])> + '_ {
        self.collections
            .iter()
            .map(|(name, documents)| (*name, documents.as_slice()))
    }

    fn push(&mut self, collection: &'static str, document: Document) {
        match self.collections.iter_mut().find(|(name, _)| *name == collection) {
            Some((_, documents)) => documents.push(document),
            None => self.collections.push((collection, vec![document])),
        }
    }

    fn sort_collections(&mut self) {
        self.collections.sort_by_key(|(name, _)| {
            TRACKED_COLLECTIONS
                .iter()
                .position(|tracked| tracked == name)
                .unwrap_or(usize::MAX)
        });
    }
}

struct EmployeeSeed {
    id: String,
    hire_date: DateTime<Utc>,
}

pub struct FixtureGenerator {
    rng: StdRng,
    profile: FixtureProfile,
    now: DateTime<Utc>,
}

impl FixtureGenerator {
    pub fn new(seed: u64, profile: FixtureProfile, now: DateTime<Utc>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            profile,
            now,
        }
    }

    pub fn generate(mut self) -> FixtureSet {
        let mut set = FixtureSet::default();
        for _ in 0..self.profile.companies {
            self.company(&mut set);
        }
        set.sort_collections();
        set
    }

    fn company(&mut self, set: &mut FixtureSet) {
        let company_id = self.id("CLI");
        let employee_count = self
            .rng
            .random_range(5..=self.profile.max_employees_per_company.max(5));

        let mut employees = Vec::with_capacity(employee_count);
        let mut embedded = Vec::with_capacity(employee_count);
        for _ in 0..employee_count {
            let (seed, document) = self.employee();
            embedded.push(Bson::Document(document.clone()));
            set.push("employees", document);
            employees.push(seed);
        }

        let company = doc! {
            "id": company_id.as_str(),
            "name": format!("{} {}", self.pick(&catalog::LAST_NAMES), self.pick(&catalog::COMPANY_SUFFIXES)),
            "city": self.pick(&catalog::CITIES),
            "country": self.pick(&catalog::COUNTRIES),
            "employees": embedded,
        };
        set.push("companies", company);

        let postings = self.rng.random_range(1..=self.profile.max_job_postings.max(1));
        for _ in 0..postings {
            self.job_posting(set, &company_id);
        }

        for employee in &employees {
            let documents = self.rng.random_range(1..=self.profile.max_documents.max(1));
            for _ in 0..documents {
                let document = doc! {
                    "id": self.id("DOC"),
                    "employee_id": employee.id.as_str(),
                    "type": self.pick(&catalog::DOCUMENT_TYPES),
                    "status": self.pick(&catalog::DOCUMENT_STATUSES),
                    "created_at": self.between(employee.hire_date, self.now),
                };
                set.push("documents", document);
            }
        }

        for month in 0..self.profile.payroll_months {
            let period = (self.now - Duration::days(30 * month as i64))
                .format("%Y-%m")
                .to_string();
            for employee in &employees {
                let payroll = doc! {
                    "id": self.id("PAY"),
                    "employee_id": employee.id.as_str(),
                    "period": period.as_str(),
                    "gross_salary": self.rng.random_range(200_000..=1_000_000_i32),
                    "net_salary": self.rng.random_range(150_000..=900_000_i32),
                };
                set.push("payrolls", payroll);
            }
        }

        for employee in &employees {
            let reviews = self.rng.random_range(1..=self.profile.max_reviews.max(1));
            for _ in 0..reviews {
                let review = doc! {
                    "id": self.id("REV"),
                    "employee_id": employee.id.as_str(),
                    "review_date": self.between(employee.hire_date, self.now),
                    "score": self.rng.random_range(1..=5_i32),
                };
                set.push("performance_reviews", review);
            }
        }

        for employee in &employees {
            let workflows = self.rng.random_range(1..=self.profile.max_workflows.max(1));
            for _ in 0..workflows {
                let workflow = doc! {
                    "id": self.id("WF"),
                    "employee_id": employee.id.as_str(),
                    "type": self.pick(&catalog::WORKFLOW_TYPES),
                    "status": self.pick(&catalog::WORKFLOW_STATUSES),
                    "created_at": self.between(employee.hire_date, self.now),
                };
                set.push("workflows", workflow);
            }
        }
    }

    fn employee(&mut self) -> (EmployeeSeed, Document) {
        let id = self.id("EMP");
        let first_name = self.pick(&catalog::FIRST_NAMES);
        let last_name = self.pick(&catalog::LAST_NAMES);
        let department = self.pick(&catalog::DEPARTMENTS);
        let position = self.pick(catalog::job_titles(department));
        let hire_date = self.between_instants(self.now - Duration::days(730), self.now);
        let status = match self.rng.random_range(0..100) {
            0..=84 => "active",
            85..=94 => "on_leave",
            _ => "terminated",
        };

        let document = doc! {
            "id": id.as_str(),
            "first_name": first_name,
            "last_name": last_name,
            "email": format!("{}.{}@example.fr", first_name.to_lowercase(), last_name.to_lowercase()),
            "department": department,
            "position": position,
            "hire_date": to_bson(hire_date),
            "status": status,
        };
        (EmployeeSeed { id, hire_date }, document)
    }

    fn job_posting(&mut self, set: &mut FixtureSet, company_id: &str) {
        let posting_id = self.id("JOB");
        let title_department = self.pick(&catalog::DEPARTMENTS);
        let posted_at = self.between_instants(self.now - Duration::days(365), self.now);

        let count = self.rng.random_range(3..=self.profile.max_applications.max(3));
        let mut applications = Vec::with_capacity(count);
        for _ in 0..count {
            let application = doc! {
                "id": self.id("APP"),
                "job_posting_id": posting_id.as_str(),
                "candidate_name": format!("{} {}", self.pick(&catalog::FIRST_NAMES), self.pick(&catalog::LAST_NAMES)),
                "status": self.pick(&catalog::APPLICATION_STATUSES),
                "applied_at": self.between(posted_at, self.now),
            };
            applications.push(Bson::Document(application.clone()));
            set.push("applications", application);
        }

        let posting = doc! {
            "id": posting_id.as_str(),
            "client_id": company_id,
            "title": self.pick(catalog::job_titles(title_department)),
            "department": self.pick(&catalog::DEPARTMENTS),
            "posted_at": to_bson(posted_at),
            "status": self.pick(&catalog::POSTING_STATUSES),
            "applications": applications,
        };
        set.push("job_postings", posting);
    }

    fn id(&mut self, prefix: &str) -> String {
        format!("{prefix}_{:08x}", self.rng.random::<u32>())
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options[self.rng.random_range(0..options.len())]
    }

    fn between_instants(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
        let span = (end - start).num_seconds();
        if span <= 0 {
            return start;
        }
        start + Duration::seconds(self.rng.random_range(0..=span))
    }

    fn between(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> BsonDateTime {
        to_bson(self.between_instants(start, end))
    }
}

fn to_bson(instant: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(instant.timestamp_millis())
}

#[derive(Debug, thiserror::Error)]
#[error("unable to load fixtures into '{collection}': {source}")]
pub struct FixtureError {
    pub collection: String,
    #[source]
    pub source: StoreError,
}

/// Clears every collection of `set`, then bulk inserts each non-empty one.
/// Not transactional: a failure leaves earlier collections replaced.
pub fn load_fixtures(
    writer: &dyn CollectionWriter,
    set: &FixtureSet,
) -> Result<Vec<(&'static str, usize)>, FixtureError> {
    for (collection, _) in set.iter() {
        let removed = writer.clear(collection).map_err(|source| FixtureError {
            collection: collection.to_string(),
            source,
        })?;
        info!(collection, removed, "collection cleared");
    }

    let mut inserted = Vec::new();
    for (collection, documents) in set.iter() {
        if documents.is_empty() {
            continue;
        }
        let count = writer
            .insert_many(collection, documents.to_vec())
            .map_err(|source| FixtureError {
                collection: collection.to_string(),
                source,
            })?;
        info!(collection, inserted = count, "documents inserted");
        inserted.push((collection, count));
    }
    Ok(inserted)
}
