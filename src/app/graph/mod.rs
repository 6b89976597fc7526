pub(in crate::app) mod build;
mod interaction;
mod view;
