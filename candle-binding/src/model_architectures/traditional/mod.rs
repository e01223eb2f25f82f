//! Traditional Fine-Tuned Sentiment Models

pub mod bert;
pub mod checkpoint;
pub mod distilbert;
pub mod quantized_distilbert;

pub use bert::BertSentimentClassifier;
pub use distilbert::DistilBertSentimentClassifier;
pub use quantized_distilbert::QuantizedDistilBertClassifier;

#[cfg(test)]
pub mod distilbert_test;
