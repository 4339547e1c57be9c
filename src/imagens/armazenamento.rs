// src/imagens/armazenamento.rs

//! Armazenamento de imagens dos anúncios em disco.
//!
//! Os arquivos ficam em `<raiz>/anuncios/<uuid>.<ext>` e são servidos de volta em
//! `<base_url>/imagens/anuncios/<uuid>.<ext>`. O nome original enviado pelo cliente
//! nunca é usado no caminho, apenas a extensão.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

/// Tipos MIME aceitos no upload.
pub const TIPOS_PERMITIDOS: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Tamanho máximo de cada imagem (5MB).
pub const TAMANHO_MAXIMO: usize = 5 * 1024 * 1024;

/// Pasta (e prefixo de URL) onde as imagens dos anúncios são gravadas.
pub const PASTA_ANUNCIOS: &str = "anuncios";

const EXTENSOES_PERMITIDAS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Error)]
pub enum ErroArmazenamento {
    #[error("arquivo vazio")]
    Vazio,
    #[error("arquivo excede o limite de {limite} bytes")]
    MuitoGrande { limite: usize },
    #[error("tipo de arquivo não permitido: {0}")]
    TipoNaoPermitido(String),
    #[error("caminho de arquivo inválido")]
    CaminhoInvalido,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Resultado de uma imagem gravada.
#[derive(Debug, Clone)]
pub struct ImagemArmazenada {
    /// Caminho relativo à raiz, ex.: `anuncios/<uuid>.png`.
    pub caminho: String,
    pub url_publica: String,
    pub tamanho: usize,
}

#[derive(Debug)]
pub struct ArmazenamentoImagens {
    raiz: PathBuf,
    base_url: String,
}

impl ArmazenamentoImagens {
    /// Cria o armazenamento, criando a pasta de anúncios se necessário.
    pub fn new(raiz: PathBuf, base_url: &str) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(raiz.join(PASTA_ANUNCIOS))?;
        Ok(Self {
            raiz,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Prefixo comum a todas as URLs públicas de imagens.
    pub fn prefixo_publico(&self) -> String {
        format!("{}/imagens/", self.base_url)
    }

    /// Valida o tipo e o tamanho de um upload antes de gravar.
    pub fn validar(content_type: &str, tamanho: usize) -> Result<(), ErroArmazenamento> {
        let tipo = normalizar_tipo(content_type);
        if !TIPOS_PERMITIDOS.contains(&tipo.as_str()) {
            return Err(ErroArmazenamento::TipoNaoPermitido(tipo));
        }
        if tamanho == 0 {
            return Err(ErroArmazenamento::Vazio);
        }
        if tamanho > TAMANHO_MAXIMO {
            return Err(ErroArmazenamento::MuitoGrande {
                limite: TAMANHO_MAXIMO,
            });
        }
        Ok(())
    }

    /// Grava a imagem com um nome aleatório e devolve sua URL pública.
    pub async fn salvar(
        &self,
        nome_original: &str,
        content_type: &str,
        conteudo: &[u8],
    ) -> Result<ImagemArmazenada, ErroArmazenamento> {
        Self::validar(content_type, conteudo.len())?;

        let caminho = format!(
            "{PASTA_ANUNCIOS}/{}",
            nome_aleatorio(nome_original, content_type)
        );
        let absoluto = self.resolver(&caminho)?;
        fs::write(&absoluto, conteudo).await?;

        Ok(ImagemArmazenada {
            url_publica: format!("{}{}", self.prefixo_publico(), caminho),
            caminho,
            tamanho: conteudo.len(),
        })
    }

    /// Lê uma imagem gravada. Retorna o conteúdo e o tipo MIME.
    pub async fn ler(&self, caminho: &str) -> Result<(Vec<u8>, String), ErroArmazenamento> {
        let absoluto = self.resolver(caminho)?;
        let conteudo = fs::read(&absoluto).await?;
        let mime = mime_guess::from_path(&absoluto)
            .first_or_octet_stream()
            .to_string();
        Ok((conteudo, mime))
    }

    /// Indica se a URL aponta para uma imagem deste armazenamento.
    pub fn pertence(&self, url: &str) -> bool {
        self.caminho_da_url(url).is_some()
    }

    /// Remove a imagem correspondente a uma URL pública.
    ///
    /// Retorna `false` quando a URL não pertence a este armazenamento ou o arquivo
    /// já não existe.
    pub async fn remover_por_url(&self, url: &str) -> Result<bool, ErroArmazenamento> {
        let Some(caminho) = self.caminho_da_url(url) else {
            return Ok(false);
        };
        let absoluto = self.resolver(&caminho)?;
        match fs::remove_file(&absoluto).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn caminho_da_url(&self, url: &str) -> Option<String> {
        let caminho = url.strip_prefix(&self.prefixo_publico())?;
        let dentro_da_pasta = caminho
            .strip_prefix(PASTA_ANUNCIOS)
            .is_some_and(|resto| resto.starts_with('/') && resto.len() > 1);
        if dentro_da_pasta && caminho_seguro(caminho) {
            Some(caminho.to_string())
        } else {
            None
        }
    }

    fn resolver(&self, caminho: &str) -> Result<PathBuf, ErroArmazenamento> {
        if !caminho_seguro(caminho) {
            return Err(ErroArmazenamento::CaminhoInvalido);
        }
        Ok(self.raiz.join(caminho))
    }
}

/// Só aceita caminhos relativos compostos de componentes normais.
fn caminho_seguro(caminho: &str) -> bool {
    let path = Path::new(caminho);
    !caminho.is_empty()
        && !caminho.contains('\\')
        && path
            .components()
            .all(|componente| matches!(componente, Component::Normal(_)))
}

/// Remove parâmetros (`; charset=...`) e normaliza para minúsculas.
fn normalizar_tipo(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Gera `<uuid>.<ext>`. A extensão vem do nome original quando é uma extensão de
/// imagem conhecida; caso contrário, é derivada do tipo MIME.
pub fn nome_aleatorio(nome_original: &str, content_type: &str) -> String {
    let extensao_original = nome_original
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| EXTENSOES_PERMITIDAS.contains(&ext.as_str()));

    let extensao = extensao_original.unwrap_or_else(|| {
        match normalizar_tipo(content_type).as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
        .to_string()
    });

    format!("{}.{}", Uuid::new_v4(), extensao)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8080";

    fn armazenamento() -> (tempfile::TempDir, ArmazenamentoImagens) {
        let dir = tempfile::tempdir().unwrap();
        let armazenamento = ArmazenamentoImagens::new(dir.path().to_path_buf(), BASE).unwrap();
        (dir, armazenamento)
    }

    #[test]
    fn nome_aleatorio_preserva_extensao_de_imagem() {
        let nome = nome_aleatorio("Foto da Loja.PNG", "image/png");
        assert!(nome.ends_with(".png"));
        assert!(!nome.contains("Loja"));
        let (id, _) = nome.split_once('.').unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn nome_aleatorio_ignora_extensao_estranha() {
        assert!(nome_aleatorio("script.sh", "image/webp").ends_with(".webp"));
        assert!(nome_aleatorio("semextensao", "image/jpeg").ends_with(".jpg"));
    }

    #[test]
    fn nomes_nao_se_repetem() {
        assert_ne!(
            nome_aleatorio("a.jpg", "image/jpeg"),
            nome_aleatorio("a.jpg", "image/jpeg")
        );
    }

    #[test]
    fn validar_tipo_e_tamanho() {
        assert!(ArmazenamentoImagens::validar("image/png", 10).is_ok());
        assert!(ArmazenamentoImagens::validar("IMAGE/JPEG; charset=binary", 10).is_ok());
        assert!(matches!(
            ArmazenamentoImagens::validar("application/pdf", 10),
            Err(ErroArmazenamento::TipoNaoPermitido(_))
        ));
        assert!(matches!(
            ArmazenamentoImagens::validar("image/png", 0),
            Err(ErroArmazenamento::Vazio)
        ));
        assert!(matches!(
            ArmazenamentoImagens::validar("image/png", TAMANHO_MAXIMO + 1),
            Err(ErroArmazenamento::MuitoGrande { .. })
        ));
    }

    #[actix_web::test]
    async fn salvar_ler_e_remover() {
        let (_dir, armazenamento) = armazenamento();
        let imagem = armazenamento
            .salvar("foto.webp", "image/webp", b"RIFFxxxxWEBP")
            .await
            .unwrap();

        assert!(imagem.caminho.starts_with("anuncios/"));
        assert!(imagem
            .url_publica
            .starts_with("http://localhost:8080/imagens/anuncios/"));
        assert!(armazenamento.pertence(&imagem.url_publica));

        let (conteudo, mime) = armazenamento.ler(&imagem.caminho).await.unwrap();
        assert_eq!(conteudo, b"RIFFxxxxWEBP");
        assert_eq!(mime, "image/webp");

        assert!(armazenamento.remover_por_url(&imagem.url_publica).await.unwrap());
        assert!(!armazenamento.remover_por_url(&imagem.url_publica).await.unwrap());
    }

    #[test]
    fn urls_externas_ou_com_travessia_nao_pertencem() {
        let (_dir, armazenamento) = armazenamento();
        assert!(!armazenamento.pertence("https://outro.site/imagens/anuncios/a.png"));
        assert!(!armazenamento.pertence("http://localhost:8080/imagens/anuncios/../segredo"));
        assert!(!armazenamento.pertence("http://localhost:8080/imagens/outra/a.png"));
        assert!(!armazenamento.pertence("http://localhost:8080/imagens/anuncios/"));
    }

    #[actix_web::test]
    async fn ler_rejeita_travessia() {
        let (_dir, armazenamento) = armazenamento();
        assert!(matches!(
            armazenamento.ler("../etc/passwd").await,
            Err(ErroArmazenamento::CaminhoInvalido)
        ));
        assert!(matches!(
            armazenamento.ler("/etc/passwd").await,
            Err(ErroArmazenamento::CaminhoInvalido)
        ));
    }
}
