fn main() {
    parley::config::load_dotenv();
    parley::init_tracing();
    dioxus::launch(parley::ui::App);
}
