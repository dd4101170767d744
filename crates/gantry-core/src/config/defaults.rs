//! Default configuration values

use super::types::Config;

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "gantry.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "gantry.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".gantry.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".gantry.toml",
    ]
}

/// Generate default configuration YAML
pub fn default_config_yaml() -> String {
    let config = Config::default();
    serde_yaml::to_string(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Gantry Configuration
# Paths are relative to the directory holding this file.

clean:
  - name: js
    description: JavaScript files
    targets: [app/static/javascripts]
  - name: css
    description: CSS files
    targets: [app/static/stylesheets]
  - name: legacy
    description: legacy directories
    targets:
      - app/assets/scss/toolkit
      - app/templates/toolkit
      - app/assets/scss/govuk
    remove_roots: true

copy:
  - name: frameworks
    description: frameworks YAML into app folder
    source: node_modules/digitalmarketplace-frameworks/frameworks
    destination: app/content/frameworks
  - name: images
    description: image assets from app to static folder
    source: app/assets/images
    destination: app/static/images
  - name: "govuk_frontend_assets:fonts"
    description: fonts from the GOV.UK frontend assets
    source: node_modules/govuk-frontend/govuk/assets/fonts
    destination: app/static/fonts
  - name: "govuk_frontend_assets:images"
    description: images from GOV.UK frontend assets
    source: node_modules/govuk-frontend/govuk/assets/images
    destination: app/static/images

styles:
  task: sass
  source_glob: "app/assets/scss/application*.scss"
  destination: app/static/stylesheets

scripts:
  task: js
  entry: app/assets/javascripts/application.js
  destination: app/static/javascripts
  maps_dir: maps

watch:
  debounce_ms: 250
  rules:
    - glob: "app/assets/**/*.js"
      task: js
    - glob: "app/assets/**/*.scss"
      task: sass
    - glob: "node_modules/digitalmarketplace-frameworks/**"
      task: "copy:frameworks"

profiles:
  development:
    css:
      output_style: expanded
      source_comments: true
      source_maps: false
      quiet: false
      include_paths: [app/assets/scss, node_modules/govuk-frontend]
    js:
      minify: false
      preserve_comments: true
      emit_source_map: true
  production:
    css:
      output_style: compressed
      source_comments: false
      source_maps: false
      quiet: true
      include_paths: [app/assets/scss, node_modules/govuk-frontend]
    js:
      minify: true
      preserve_comments: false
      emit_source_map: true
"#;
