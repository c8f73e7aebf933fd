pub mod output_sink_adapter;
pub mod pdf_writer_adapter;
pub mod toml_overrides_loader;
