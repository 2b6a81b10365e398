pub mod config;
pub mod csv_source;
pub mod openai_client;
pub mod pinecone_client;
