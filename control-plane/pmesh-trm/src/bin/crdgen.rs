use kube::core::CustomResourceExt;
use pmesh_trm::crd::preview_env::PreviewEnv;
use pmesh_trm::crd::traffic_policy::TrafficPolicy;

fn main() {
    let envs = serde_yaml::to_string(&PreviewEnv::crd())
        .expect("serialize CRD to YAML");
    let policies = serde_yaml::to_string(&TrafficPolicy::crd())
        .expect("serialize CRD to YAML");
    println!("{}---\n{}", envs, policies);
}
