use mongodb::{Client, Collection, Database};
use std::error::Error;

pub const LESSONS: &str = "Lessons";
pub const USERS: &str = "Users";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Studio traffic is small; keep a modest pool warm
        client_options.max_pool_size = Some(10);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty() && !s.contains(':') && !s.contains('@'))
            .unwrap_or("StudioBooking");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes used by the schedule and booking queries
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let lessons = self.collection::<mongodb::bson::Document>(LESSONS);

        // Lessons(date) - schedule listing and stats windows
        let date_index = IndexModel::builder()
            .keys(doc! { "date": 1, "time": 1 })
            .build();

        match lessons.create_index(date_index).await {
            Ok(_) => log::info!("   ✅ Index created: {}(date, time)", LESSONS),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // Lessons(waitingList) - "which lessons is this phone in"
        let participants_index = IndexModel::builder()
            .keys(doc! { "waitingList": 1 })
            .build();

        match lessons.create_index(participants_index).await {
            Ok(_) => log::info!("   ✅ Index created: {}(waitingList)", LESSONS),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
