pub mod connection_bootstrap;
