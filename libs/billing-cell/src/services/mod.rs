pub mod invoice;

pub use invoice::InvoiceService;
